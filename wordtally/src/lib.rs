pub mod config;
pub mod errors;
pub mod input;
pub mod metrics;
pub mod output;
pub mod results;
pub mod tally;

pub use config::{CliOverrides, EncodingMode, TallyConfig};
pub use errors::{TallyError, TallyResult};
pub use output::OutputFormat;
pub use results::{PatternFailure, ResultTable, TallyOutput};
pub use tally::{run, run_config, Pattern, TallyEngine, TallyOptions};
