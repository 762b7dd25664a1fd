//! # formation
//!
//! Template-side toolkit for cloud stack orchestration.
//!
//! This crate provides functionality for:
//! - Modeling compiled templates as a declarative JSON tree
//! - Extracting and validating declared parameter constraints
//! - Scrubbing authoring-time metadata from parameter blocks
//! - Building the stack definition payload submitted to the remote API
//!
//! ## Example
//!
//! ```
//! use formation::{Template, StackOptions, build, validate};
//!
//! let mut template = Template::from_json(r#"{
//!     "Parameters": {
//!         "InstanceType": {
//!             "Type": "String",
//!             "AllowedValues": ["t2.micro", "t2.small"]
//!         }
//!     },
//!     "Resources": {}
//! }"#).unwrap();
//!
//! // Validate an operator-supplied value against the declared constraint
//! let parameters = template.parameters();
//! let (_, constraint) = &parameters[0];
//! assert!(validate("t2.micro", constraint).is_empty());
//! assert!(!validate("m4.large", constraint).is_empty());
//!
//! // Build the submission payload
//! let mut options = StackOptions::default();
//! options.set_parameter("InstanceType", "t2.micro");
//! let definition = build(&mut template, &options).unwrap();
//! assert_eq!(definition.parameters.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod definition;
pub mod error;
pub mod scrubber;
pub mod template;
pub mod validator;

pub use definition::{StackDefinition, StackOptions, StackParameter, build};
pub use error::{Error, Result};
pub use scrubber::{ALLOWED_PARAMETER_ATTRIBUTES, scrub};
pub use template::{ParameterConstraint, Template};
pub use validator::{ValidationFailure, validate};
