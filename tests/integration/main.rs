//! Integration tests: full pipeline over canned data, chat flow
//! against a mock model, and the linked-entry squad fallback against
//! a local canned FPL stub. No outward network access.

mod chat_flow;
mod entry_squad;
mod mock_model;
mod pipeline;
