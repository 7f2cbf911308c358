//! Display collaborator.
//!
//! The engine reports everything the user sees through a [`Presenter`]:
//! warnings, headed answers and diagram images. Errors from the inference
//! endpoint arrive here as ordinary answer text.

use crate::diagram::ImageHandle;

/// Heading above a freshly generated answer.
pub const SOLUTION_HEADING: &str = "### ✅ Suggested Solution";

/// Heading above the accumulated answer after a continue.
pub const CONTINUED_HEADING: &str = "### ✅ Continued Response";

/// Heading above the architecture diagram section.
pub const DIAGRAM_HEADING: &str = "### 🧱 Architecture Diagram";

/// Caption attached to a rendered diagram.
pub const DIAGRAM_CAPTION: &str = "Generated Diagram";

/// Warning shown when generate is requested without a problem statement.
pub const EMPTY_NEED_WARNING: &str = "Please enter your problem statement.";

/// Receives what the user should see.
pub trait Presenter: Send {
    /// Show a validation warning.
    fn warn(&mut self, message: &str);

    /// Show markdown answer text under a heading.
    fn answer(&mut self, heading: &str, text: &str);

    /// Start the diagram section. Called before rendering begins.
    fn diagram_section(&mut self, heading: &str);

    /// Show a rendered diagram.
    fn diagram(&mut self, image: &ImageHandle, caption: &str);
}
