#![allow(dead_code)]
#[macro_use]
extern crate lazy_static;

extern crate regex;

mod affiliated;
mod babel;
mod blocks;
mod drawer;
mod environment;
mod error;
mod fixed_width;
mod footnote_definition;
mod headline;
mod keyword;
mod kind;
mod latex;
mod list;
mod markup;
mod node;
mod objects;
mod paragraph;
mod parser;
mod planning;
mod table;
mod tree;

pub mod cache;
pub mod interpret;

pub use environment::{Config, Environment};
pub use error::{StructuralError, SyncError};
pub use kind::Kind;
pub use node::{Interval, NodeData, NodeId, Tree};
pub use parser::{ParseGranularity, Parser};
