//! Game-record ingestion
//!
//! Reads the JSON game exports produced by the tournament server, merges and
//! orders them, applies the record filters and turns what is left into a
//! `RankingCorpus`.

pub mod filter;
pub mod records;

pub use filter::{
    build_corpus, filter_error_games, filter_suspect_games, CorpusFilter, CRASH_BOTS,
    SUSPECT_WORKER_CUTOFF,
};
pub use records::{
    load_game_records, merge_game_records, parse_game_records, GameRecord, RecordValue, UserRecord,
};
