//! order-distributor - Expands bundled order lines into their component items
//!
//! This crate reads an order workbook and a distribution rules workbook, matches each
//! order's free-text product name against the rule groups, and writes a result workbook
//! in which matched orders are replaced by one row per component. The header row and
//! every expanded row are shaded so that manual reviewers can spot them at a glance.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use order_distributor::DistributorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Default file names, output in the current directory
//!     let distributor = DistributorBuilder::new().build()?;
//!
//!     let summary = distributor.run()?;
//!     println!("written to {:?}", summary.output_path);
//!
//!     Ok(())
//! }
//! ```
//!
//! For in-memory processing, pass any `Read + Seek` source:
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use order_distributor::DistributorBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let distributor = DistributorBuilder::new().build()?;
//! let orders: Vec<u8> = vec![]; // Your order workbook bytes
//! let rules: Vec<u8> = vec![]; // Your rules workbook bytes
//!
//! let result = distributor.distribute(Cursor::new(orders), Cursor::new(rules))?;
//! let mut output = Vec::new();
//! distributor.write(&result, &mut output)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use order_distributor::{DistributorBuilder, DistributorError};
//!
//! fn main() -> Result<(), DistributorError> {
//!     let distributor = DistributorBuilder::new()
//!         .with_input_path("orders/2025-11-06.xlsx")
//!         .with_rules_path("rules/bundles.xlsx")
//!         .with_output_dir("out")
//!         .with_output_prefix("result_")
//!         .with_sheet_name("Result")
//!         .with_shade_color(0xCCCCCC)
//!         .build()?;
//!
//!     distributor.run()?;
//!     Ok(())
//! }
//! ```
//!
//! # Building Blocks
//!
//! The individual stages can also be used directly:
//!
//! ```rust
//! use order_distributor::matcher::match_product;
//! use order_distributor::rules::parse_ea_quantity;
//! use order_distributor::{CellValue, ComponentRule, RuleTable};
//!
//! assert_eq!(parse_ea_quantity(&CellValue::String("3 EA".to_string())), 3);
//!
//! let rules = RuleTable::from_groups(vec![
//!     ("3PN1+IF", vec![ComponentRule::new("C1", "S1", 2)]),
//! ]);
//! let matched = match_product("Pronutra VP 1", &rules).unwrap();
//! assert_eq!(matched.key, "3PN1+IF");
//! ```

mod api;
mod builder;
mod error;
pub mod expander;
pub mod header;
pub mod logging;
pub mod matcher;
mod order;
mod output;
mod parser;
pub mod rules;
mod types;

// 公開API
pub use api::{DistributionResult, DistributionSummary};
pub use builder::{output_file_name, Distributor, DistributorBuilder, DistributorConfig};
pub use error::DistributorError;
pub use expander::{Expander, OutputLayout, OutputRow};
pub use matcher::match_product;
pub use order::{coerce_purchase_quantity, OrderColumns, OrderRow};
pub use output::{OutputTable, ShadingWriter, DEFAULT_SHADE_COLOR};
pub use rules::RuleTable;
pub use types::{CellValue, ComponentRule, SheetTable};
