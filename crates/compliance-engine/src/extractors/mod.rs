pub mod text;

pub use text::{
    select_strategy, CharSource, ExtractionStrategy, PageText, StrategyAttempt, StrategySelection,
};
