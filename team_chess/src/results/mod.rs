//! Board results: upsert, completeness gate and round commit.
//!
//! Single board writes are never blocked. Only [`ResultManager::commit_round`]
//! requires the round to be complete, counting drafted results.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use team_chess::db::{MemoryStore, Records};
//! use team_chess::results::{BoardEntry, ResultManager};
//! use team_chess::tournament::GameResult;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = Records::new(Arc::new(MemoryStore::open("db.json").await?));
//!     let results = ResultManager::new(records);
//!
//!     results
//!         .upsert_board_result(BoardEntry {
//!             pairing_id: "cup-r1-A-D".to_string(),
//!             desk_number: 1,
//!             player_a_id: "anna".to_string(),
//!             player_b_id: "dmitri".to_string(),
//!             result: Some(GameResult::Draw),
//!             player_a_color: None,
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod gate;
pub mod manager;
pub mod models;
pub(crate) mod sync;

pub use gate::{PairingCompleteness, RoundCompleteness, is_pairing_complete, required_desks};
pub use manager::ResultManager;
pub use models::{BoardEntry, BoardKey, DraftBoard, RoundDraft, SaveSummary};
