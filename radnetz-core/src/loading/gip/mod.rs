//! Reading GIP CSV exports (links, turn uses, nodes)

mod de;
mod parser;
mod processor;
mod raw_types;

pub use parser::{deserialize_csv_file, parse_line, parse_point};
pub use processor::{GipDataset, link_from_record, load_gip_dataset};
pub use raw_types::{FeedNode, FeedTurnUse};
