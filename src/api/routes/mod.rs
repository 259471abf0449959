pub mod prizes;
pub mod refresh;
pub mod repeats;
pub mod stats;
pub mod suggestions;
