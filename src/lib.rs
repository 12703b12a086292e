pub mod config;
pub mod error;
pub mod exponent;
pub mod factor;
pub mod field;
pub mod matrix;
pub mod mds;
pub mod params;
pub mod permutation;
pub mod presets;
pub mod primitive;
pub mod round_constants;
pub mod rounds;


pub use config::DerivationConfig;
pub use error::{RescueError, Result};
pub use exponent::{select_alpha, select_alpha_with_limit};
pub use factor::{factorize, is_probable_prime, Factorization};
pub use field::PrimeField;
pub use matrix::FieldMatrix;
pub use mds::build_mds;
pub use params::{assemble, assemble_many, ParameterAssembler, ParameterBundle, ParameterRequest};
pub use permutation::{RescuePermutation, RescueSponge};
pub use presets::KnownField;
pub use primitive::find_primitive_element;
pub use round_constants::derive_round_constants;
pub use rounds::{estimate_rounds, RoundCountEstimator};
