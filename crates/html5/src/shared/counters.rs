//! Optional counters for instrumentation.

#[derive(Clone, Debug, Default)]
pub struct Counters {
    pub tokens_emitted: u64,
    pub parse_errors: u64,
    pub max_open_elements_depth: u32,
    pub max_active_formatting_depth: u32,
}
