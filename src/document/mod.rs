/*!
 * `.docx` package and content stream handling.
 *
 * - `package`: opening the archive and rebuilding it around a new content stream
 * - `markup`: segment extraction, write-back and the uniform font rewrite
 * - `artifact`: the finished document handed back to the caller
 */

pub mod artifact;
pub mod markup;
pub mod package;

pub use artifact::DownloadArtifact;
pub use markup::{ContentDocument, Segment, TextAnchor};
pub use package::{DocxPackage, CONTENT_STREAM, DOCX_MEDIA_TYPE};
