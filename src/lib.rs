//! # imgpress
//!
//! A batch image compressor. JPEG, PNG and WebP files go in; re-encoded,
//! optionally resized files named `compressed_<name>` come out, one per input
//! or bundled in a single ZIP.
//!
//! # Pipeline
//!
//! ```text
//! paths ─ source ─▶ SourceImage ─ compress ─▶ CompressedResult ─ archive ─▶ files / .zip
//!                       │                            ▲
//!                       └────────── batch ───────────┘  (sequential, ordered)
//! ```
//!
//! 1. [`source`] expands command-line paths into in-memory [`types::SourceImage`]s
//!    and sets aside files of unsupported types.
//! 2. [`compress`] re-encodes one image: decode, rasterize, encode, and retry
//!    once at a lower quality when the output did not shrink.
//! 3. [`batch`] runs that over the whole list, one image at a time, keeping
//!    input order and collecting failures instead of stopping on them.
//! 4. [`archive`] writes the results under their derived names.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`settings`] | `CompressionMode`, `CompressionSettings`, `QualityPolicy` and their validation |
//! | [`types`] | `SourceImage`, `CompressedResult`, and the serializable `ResultReport` |
//! | [`imaging`] | Backend trait, pure-Rust `image` backend, quality and ratio calculations |
//! | [`compress`] | Single-image compression with the shrink check and one retry |
//! | [`batch`] | Sequential batch coordinator, progress events, `BatchSummary` |
//! | [`source`] | Input discovery from files and directories |
//! | [`naming`] | `compressed_` prefix and collision-free output names |
//! | [`archive`] | Individual file output and the batch ZIP |
//! | [`config`] | `imgpress.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting for progress, summary, and `check` |
//!
//! # Design Decisions
//!
//! ## Mode Is a Type, Not a String
//!
//! [`settings::CompressionMode`] decides both the first encode quality and
//! the output codec. Nothing downstream compares mode names; adding a mode
//! means adding a variant and letting the compiler find every `match`.
//!
//! ## Bounded Retry
//!
//! The retry is a loop capped by [`compress::MAX_ATTEMPTS`], not a recursive
//! call. The second attempt is always accepted, so a file that cannot be made
//! smaller still produces a result (with a negative ratio) rather than an
//! error.
//!
//! ## Sequential Batches
//!
//! Images are compressed strictly one after another. Peak memory is one
//! decoded bitmap regardless of batch size, and progress events arrive in
//! input order without any reordering.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and both encoders come from the `image`
//! crate. The binary has no system library dependencies.

pub mod archive;
pub mod batch;
pub mod compress;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod settings;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
