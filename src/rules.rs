//! Embedded FPL rules and terminology, with keyword search.
//!
//! The rulebook ships with the binary as a static tree so chat answers
//! about scoring, squad rules, or jargon never depend on the network.

use serde_json::{Map, Value};

/// One node in the rulebook: either a rule text or a named subsection.
#[derive(Debug, Clone)]
pub enum RuleNode {
    Text(&'static str),
    Section(&'static [(&'static str, RuleNode)]),
}

impl RuleNode {
    fn to_value(&self) -> Value {
        match self {
            RuleNode::Text(text) => Value::String((*text).to_string()),
            RuleNode::Section(entries) => {
                let mut map = Map::new();
                for (key, node) in *entries {
                    map.insert((*key).to_string(), node.to_value());
                }
                Value::Object(map)
            }
        }
    }
}

const SCORING_GOALS: &[(&str, RuleNode)] = &[
    ("forward", RuleNode::Text("Forwards get 4 points per goal scored.")),
    ("midfielder", RuleNode::Text("Midfielders get 5 points per goal scored.")),
    ("defender", RuleNode::Text("Defenders get 6 points per goal scored.")),
    ("goalkeeper", RuleNode::Text("Goalkeepers get 6 points per goal scored.")),
];

const SCORING_CLEAN_SHEETS: &[(&str, RuleNode)] = &[
    ("defender", RuleNode::Text("Defenders get 4 points for a clean sheet.")),
    ("goalkeeper", RuleNode::Text("Goalkeepers get 4 points for a clean sheet.")),
    ("midfielder", RuleNode::Text("Midfielders get 1 point for a clean sheet.")),
    ("forward", RuleNode::Text("Forwards don't get points for clean sheets.")),
];

const SCORING: &[(&str, RuleNode)] = &[
    (
        "playing",
        RuleNode::Text(
            "Players who play up to 60 minutes get 1 point. Players who play 60+ minutes get 2 points.",
        ),
    ),
    ("goals", RuleNode::Section(SCORING_GOALS)),
    ("assists", RuleNode::Text("All players get 3 points per assist.")),
    ("clean_sheets", RuleNode::Section(SCORING_CLEAN_SHEETS)),
    ("saves", RuleNode::Text("Goalkeepers get 1 point for every 3 saves made.")),
    ("penalty_save", RuleNode::Text("5 points for saving a penalty.")),
    ("penalty_miss", RuleNode::Text("-2 points for missing a penalty.")),
    ("yellow_card", RuleNode::Text("-1 point for receiving a yellow card.")),
    ("red_card", RuleNode::Text("-3 points for receiving a red card.")),
    ("own_goal", RuleNode::Text("-2 points for scoring an own goal.")),
    (
        "bonus",
        RuleNode::Text("1-3 bonus points awarded to the best performing players in each match."),
    ),
];

const TEAM_CHIPS: &[(&str, RuleNode)] = &[
    (
        "wildcard",
        RuleNode::Text(
            "Unlimited transfers in a single gameweek without point deductions. Can be used twice per season (once in each half).",
        ),
    ),
    (
        "free_hit",
        RuleNode::Text(
            "Temporary wildcard for a single gameweek. Team reverts to previous gameweek's team afterward.",
        ),
    ),
    (
        "bench_boost",
        RuleNode::Text("Points scored by bench players are included in the gameweek's total."),
    ),
    (
        "triple_captain",
        RuleNode::Text("Captain scores triple points instead of double for the gameweek."),
    ),
];

const TEAM_RULES: &[(&str, RuleNode)] = &[
    ("budget", RuleNode::Text("£100 million initial budget to build your squad.")),
    (
        "squad_size",
        RuleNode::Text(
            "15 players total: 2 goalkeepers, 5 defenders, 5 midfielders, and 3 forwards.",
        ),
    ),
    (
        "formation",
        RuleNode::Text(
            "Must play a valid formation with 1 goalkeeper, at least 3 defenders, at least 2 midfielders, and at least 1 forward.",
        ),
    ),
    (
        "captaincy",
        RuleNode::Text(
            "Captain scores double points. Vice-captain is automatic replacement if captain doesn't play.",
        ),
    ),
    (
        "transfers",
        RuleNode::Text("1 free transfer per gameweek. Additional transfers cost 4 points each."),
    ),
    ("chips", RuleNode::Section(TEAM_CHIPS)),
    (
        "team_limit",
        RuleNode::Text("Maximum of 3 players from any single Premier League team."),
    ),
];

const RULES: &[(&str, RuleNode)] = &[
    ("scoring", RuleNode::Section(SCORING)),
    ("team_rules", RuleNode::Section(TEAM_RULES)),
    (
        "deadlines",
        RuleNode::Text(
            "Team changes must be confirmed before the gameweek deadline (90 minutes before the first match of the gameweek).",
        ),
    ),
    (
        "price_changes",
        RuleNode::Text(
            "Player prices change based on transfer activity. Players can rise or fall by up to £0.3m per gameweek.",
        ),
    ),
    (
        "wildcards",
        RuleNode::Text(
            "2 wildcards per season: 1 to use before gameweek 20 deadline, and 1 to use after gameweek 20 deadline.",
        ),
    ),
    (
        "double_gameweeks",
        RuleNode::Text("Some teams play twice in a single gameweek due to rescheduled fixtures."),
    ),
    (
        "blank_gameweeks",
        RuleNode::Text(
            "Some teams don't play in certain gameweeks due to fixture clashes with other competitions.",
        ),
    ),
];

const TERMINOLOGY: &[(&str, &str)] = &[
    ("BGW", "Blank Gameweek - when teams have no fixture in a gameweek."),
    ("DGW", "Double Gameweek - when teams play twice in a single gameweek."),
    ("TGW", "Triple Gameweek - rare occurrence when a team plays three matches in a single gameweek."),
    ("OOP", "Out of Position - a player listed in one position but playing in a more advanced role."),
    ("ICT Index", "Influence, Creativity, Threat Index - statistical metric to help make transfer decisions."),
    ("xG", "Expected Goals - statistical measure of the quality of goal-scoring chances."),
    ("xA", "Expected Assists - statistical measure of the quality of chances created."),
    ("EO", "Effective Ownership - percentage of active teams in which a player's points count."),
    ("TC", "Triple Captain - chip that triples captain's points for one gameweek."),
    ("BB", "Bench Boost - chip that counts bench players' points for one gameweek."),
    ("FH", "Free Hit - chip that allows temporary unlimited transfers for one gameweek."),
    ("WC", "Wildcard - chip that allows unlimited transfers without point penalties."),
    ("xMins", "Expected Minutes - predicted playing time for a player."),
    ("Autosubs", "Automatic substitutions - bench players automatically replace starters who don't play."),
    ("Hit", "Taking a hit - making extra transfers beyond the free transfer, costing 4 points each."),
    ("Price Rise/Fall", "When players' values increase or decrease based on transfer activity."),
    ("Differential", "Player with low ownership percentage who could give you an advantage."),
    ("Template", "Common player selections found in many FPL teams."),
    ("Set and Forget", "Selecting a player/team and keeping them regardless of fixtures."),
    ("Knee-jerk", "Making impulsive transfers based on recent performance without considering long-term value."),
    ("Gandhi Rule", "Unofficial rule suggesting not to captain players in early kickoff matches."),
    ("Form", "A player's recent performance level, often measured by points in last 5 gameweeks."),
    ("Fixtures", "Upcoming matches for a team, rated by difficulty."),
    ("Squad Value", "Total market value of all players in your team."),
    ("Team Value", "Amount available to spend if you sold all your players (purchase price + profit)."),
    ("ITB", "In The Bank - money not spent on your squad, available for future transfers."),
    ("Bandwagon", "When many managers transfer in the same player after good performances."),
    ("Essential", "Players considered must-haves due to form, fixtures, or value."),
];

/// Keywords that pull a whole section into the results regardless of
/// which individual rules matched.
const SCORING_KEYWORDS: &[&str] = &[
    "point", "score", "goal", "assist", "clean sheet", "yellow", "red card", "bonus",
];

const TEAM_RULE_KEYWORDS: &[&str] = &[
    "budget", "squad", "formation", "captain", "transfer", "chip", "wildcard", "free hit",
    "bench boost", "triple captain",
];

const NO_MATCH: &str = "No specific FPL rules found for this query.";

/// Searchable view over the embedded rulebook.
#[derive(Debug, Clone, Default)]
pub struct RulesIndex;

impl RulesIndex {
    pub fn new() -> Self {
        RulesIndex
    }

    /// The whole rulebook plus terminology as JSON, for persistence
    /// and the HTTP surface.
    pub fn as_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("rules".to_string(), RuleNode::Section(RULES).to_value());
        let mut terms = Map::new();
        for (term, definition) in TERMINOLOGY {
            terms.insert((*term).to_string(), Value::String((*definition).to_string()));
        }
        root.insert("terminology".to_string(), Value::Object(terms));
        Value::Object(root)
    }

    /// Search rules and terminology for a free-text query.
    ///
    /// Matching is case-insensitive substring matching against leaf
    /// rule keys and texts. Certain keywords additionally append the
    /// complete scoring or team-rules section so the model sees the
    /// full context, even when individual rules already matched.
    pub fn search(&self, query: &str) -> String {
        let query = query.to_lowercase();
        let mut results = Vec::new();

        for (key, node) in RULES {
            collect_matches(&query, &[key], node, &mut results);
        }

        for (term, definition) in TERMINOLOGY {
            if term.to_lowercase().contains(&query) || definition.to_lowercase().contains(&query) {
                results.push(format!("Term: {term} - {definition}"));
            }
        }

        if SCORING_KEYWORDS.iter().any(|kw| query.contains(kw)) {
            results.push(format!(
                "Complete Scoring Rules: {}",
                pretty_section(SCORING)
            ));
        }
        if TEAM_RULE_KEYWORDS.iter().any(|kw| query.contains(kw)) {
            results.push(format!(
                "Complete Team Rules: {}",
                pretty_section(TEAM_RULES)
            ));
        }

        if results.is_empty() {
            NO_MATCH.to_string()
        } else {
            results.join("\n\n")
        }
    }
}

/// Depth-first walk matching against leaf keys and texts; the result
/// label is the capitalized path, "Scoring - Goals - Forward: ...".
fn collect_matches(query: &str, path: &[&str], node: &RuleNode, results: &mut Vec<String>) {
    match node {
        RuleNode::Text(text) => {
            let leaf_key = path.last().copied().unwrap_or_default();
            if leaf_key.to_lowercase().contains(query) || text.to_lowercase().contains(query) {
                let label: Vec<String> = path.iter().map(|p| capitalize(p)).collect();
                results.push(format!("{}: {text}", label.join(" - ")));
            }
        }
        RuleNode::Section(entries) => {
            for (key, child) in *entries {
                let mut child_path = path.to_vec();
                child_path.push(key);
                collect_matches(query, &child_path, child, results);
            }
        }
    }
}

fn pretty_section(section: &'static [(&'static str, RuleNode)]) -> String {
    serde_json::to_string_pretty(&RuleNode::Section(section).to_value())
        .unwrap_or_else(|_| "{}".to_string())
}

/// First letter uppercase, the rest lowercase.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
