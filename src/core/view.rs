use super::request::GenerationResult;
use super::upload::Thumbnail;

/// Display surface driven by the controller.
///
/// Each front end implements this: the TUI renders it as a form with modal
/// overlays, the `generate` command as a spinner and console output.
pub trait View {
    /// Filename label of the attached base image. Empty string clears it.
    fn set_file_name(&mut self, name: &str);

    /// Show or hide the container listing the attached file
    fn set_file_info_visible(&mut self, visible: bool);

    /// `None` clears and hides the preview
    fn set_preview(&mut self, preview: Option<&Thumbnail>);

    /// Clear the file picker so the same file can be selected again
    fn reset_file_picker(&mut self);

    fn show_loading(&mut self);

    fn hide_loading(&mut self);

    /// Set the result image and download link, then open the result view
    fn show_result(&mut self, result: &GenerationResult);

    /// Blocking, user-visible message
    fn alert(&mut self, message: &str);
}
