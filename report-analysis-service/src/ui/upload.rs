//! Upload zone: drag gestures, the file chooser and the busy flag.

use super::html::escape;

pub const ACCEPT_FILTER: &str = ".pdf,image/*";

/// A file chosen in the upload zone, as shown back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Size in kilobytes with one decimal, e.g. `2.0 KB`.
    pub fn display_size(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    DragEnter,
    DragOver,
    DragLeave,
    /// Files carried by a drop gesture; only the first is used.
    Drop(Vec<SelectedFile>),
    /// Files returned by the native chooser; only the first is used.
    Choose(Vec<SelectedFile>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadZone {
    drag_active: bool,
    selected: Option<SelectedFile>,
    busy: bool,
}

impl UploadZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    /// Apply one event. `on_select` runs at most once, and only when the event
    /// delivers a file while the zone is not busy.
    pub fn handle<F>(&mut self, event: UploadEvent, on_select: F)
    where
        F: FnOnce(&SelectedFile),
    {
        match event {
            UploadEvent::DragEnter | UploadEvent::DragOver => self.drag_active = true,
            UploadEvent::DragLeave => self.drag_active = false,
            UploadEvent::Drop(files) => {
                self.drag_active = false;
                self.select_first(files, on_select);
            }
            UploadEvent::Choose(files) => self.select_first(files, on_select),
        }
    }

    fn select_first<F>(&mut self, files: Vec<SelectedFile>, on_select: F)
    where
        F: FnOnce(&SelectedFile),
    {
        if self.busy {
            return;
        }
        if let Some(file) = files.into_iter().next() {
            on_select(&file);
            self.selected = Some(file);
        }
    }

    pub fn render(&self) -> String {
        let mut classes = vec!["upload-zone"];
        if self.drag_active {
            classes.push("drag-active");
        }
        if self.busy {
            classes.push("busy");
        }

        let title = match &self.selected {
            Some(file) => escape(&file.name),
            None => "Upload Medical Report".to_string(),
        };
        let disabled = if self.busy { " disabled" } else { "" };

        let mut html = String::new();
        html.push_str(r#"<div class="upload">"#);
        html.push_str(
            r#"<form id="upload-form" method="post" action="/report" enctype="multipart/form-data">"#,
        );
        html.push_str(&format!(
            r#"<div id="upload-zone" class="{}">"#,
            classes.join(" ")
        ));
        html.push_str(&format!(
            r#"<input type="file" id="file-upload" name="file" class="hidden" accept="{}"{}>"#,
            ACCEPT_FILTER, disabled
        ));
        html.push_str(r#"<label for="file-upload" class="upload-label">"#);
        html.push_str(r#"<div class="upload-icon">&#8679;</div>"#);
        html.push_str(&format!(r#"<p class="upload-title">{}</p>"#, title));
        html.push_str(r#"<p class="upload-hint">Drag and drop or click to browse</p>"#);
        html.push_str(r#"<div class="upload-types"><span>PDF</span><span>Images</span></div>"#);
        html.push_str("</label></div></form>");

        if let Some(file) = self.selected.as_ref().filter(|_| !self.busy) {
            html.push_str(&format!(
                r#"<div class="selected-file"><p><strong>Selected:</strong> {} ({})</p></div>"#,
                escape(&file.name),
                file.display_size()
            ));
        }

        html.push_str("</div>");
        html
    }
}
