//! Paraquery – querying paraphrase tables with a small condition language.
//!
//! A paraphrase table holds rules `source => target`, each with a
//! probability, the WordNet relation between the two phrases, and the pivot
//! phrases the rule was derived through. Analysts ask for rules with queries
//! such as:
//!
//! ```text
//! source = "barrier*" and target is 2 words
//! relation = "synonym" and prob > 0.005
//! source < target by 1 word
//! count pivots include "wall"
//! most probable
//! ```
//!
//! ## Modules
//! * [`parser`] – Recognizes a query line (grammar in `paraquery.pest`) as
//!   tagged conditions or a unary directive.
//! * [`normalize`] – Maps each condition onto a predicate over the stored
//!   columns, flipping operators and converting probabilities to costs.
//! * [`session`] – The settings every compile consults (limit, order,
//!   default exclusions, grouping).
//! * [`compile`] – Assembles predicates, default exclusions, grouping,
//!   ordering and limit into a [`compile::CompiledQuery`].
//! * [`store`] – SQLite access to the `paraphrase` table.
//! * [`relation`] – The fixed WordNet relation vocabulary.
//! * [`display`] and [`shell`] – Rendering and the command shell used by the binary.
//!
//! ## Costs
//! Probabilities are stored as costs `-ln(p)`, so a lower cost means a more
//! probable rule. `prob > 0.5` therefore compiles to `pe2e1 < 0.693…`.
//!
//! ## Quick Start
//! ```
//! use rusqlite::Connection;
//! use paraquery::{compile::compile_text, session::Settings, store::{Rule, Store, QueryResult}};
//! let conn = Connection::open_in_memory().unwrap();
//! let mut store = Store::new(&conn).unwrap();
//! store.insert(&Rule::new("barrier", "wall", 0.4)).unwrap();
//! let compilation = compile_text("source = \"barrier\"", &Settings::default()).unwrap();
//! match store.execute(&compilation.query).unwrap() {
//!     QueryResult::Rules(rows) => assert_eq!(rows[0].target, "wall"),
//!     QueryResult::Counts(_) => unreachable!(),
//! }
//! ```

pub mod compile;
pub mod configuration;
pub mod display;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod relation;
pub mod session;
pub mod shell;
pub mod store;

pub use error::{ParaqueryError, Result};
