//! XML export writer
//!
//! ```text
//! <TaskManagerExport>
//!   <Metadata>...</Metadata>
//!   <Tasks>
//!     <Task id="1"><Title>...</Title>...</Task>
//!   </Tasks>
//!   <Statistics>
//!     <GeneralStats>...</GeneralStats>
//!     <PriorityDistribution><Priority level="urgent" count="1"/>...</PriorityDistribution>
//!     <StatusDistribution><Status value="done" count="2"/>...</StatusDistribution>
//!   </Statistics>
//! </TaskManagerExport>
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{ExportError, ExportFormat, ExportPayload};
use crate::domain::{format_timestamp, Statistics, Task};

pub(super) fn write(path: &Path, payload: &ExportPayload<'_>) -> Result<(), ExportError> {
    let mut doc = XmlDoc::new();

    doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    doc.open("TaskManagerExport")?;

    doc.open("Metadata")?;
    doc.text_element("TotalTasks", &payload.metadata.total_tasks.to_string())?;
    doc.text_element("ExportedAt", &format_timestamp(&payload.metadata.exported_at))?;
    doc.text_element("Format", payload.metadata.format.as_str())?;
    doc.close("Metadata")?;

    doc.open("Tasks")?;
    for task in payload.tasks {
        write_task(&mut doc, task)?;
    }
    doc.close("Tasks")?;

    if let Some(stats) = &payload.statistics {
        write_statistics(&mut doc, stats)?;
    }

    doc.close("TaskManagerExport")?;

    let mut bytes = doc.finish();
    bytes.push(b'\n');
    fs::write(path, bytes).map_err(|e| ExportError::from_io(path, e))
}

fn write_task(doc: &mut XmlDoc, task: &Task) -> Result<(), ExportError> {
    let id = task.id().to_string();
    doc.open_with("Task", &[("id", id.as_str())])?;
    doc.text_element("Title", task.title())?;
    if !task.description().is_empty() {
        doc.text_element("Description", task.description())?;
    }
    doc.text_element("Priority", task.priority().as_str())?;
    doc.text_element("Status", task.status().as_str())?;
    doc.text_element("CreatedAt", &format_timestamp(&task.created_at()))?;
    if let Some(completed_at) = task.completed_at() {
        doc.text_element("CompletedAt", &format_timestamp(&completed_at))?;
    }
    if let Some(project_id) = task.project_id() {
        doc.text_element("ProjectId", &project_id.to_string())?;
    }
    doc.close("Task")
}

fn write_statistics(doc: &mut XmlDoc, stats: &Statistics) -> Result<(), ExportError> {
    doc.open("Statistics")?;

    doc.open("GeneralStats")?;
    doc.text_element("TotalTasks", &stats.total_tasks.to_string())?;
    doc.text_element("CompletedTasks", &stats.completed_tasks.to_string())?;
    doc.text_element("PendingTasks", &stats.pending_tasks.to_string())?;
    doc.text_element("InProgressTasks", &stats.in_progress_tasks.to_string())?;
    doc.text_element("CancelledTasks", &stats.cancelled_tasks.to_string())?;
    doc.text_element("CompletionRate", &stats.completion_rate.to_string())?;
    doc.close("GeneralStats")?;

    doc.open("PriorityDistribution")?;
    for (priority, count) in stats.priority_distribution.iter() {
        let count = count.to_string();
        doc.empty_with("Priority", &[("level", priority.as_str()), ("count", count.as_str())])?;
    }
    doc.close("PriorityDistribution")?;

    doc.open("StatusDistribution")?;
    for (status, count) in stats.status_distribution.iter() {
        let count = count.to_string();
        doc.empty_with("Status", &[("value", status.as_str()), ("count", count.as_str())])?;
    }
    doc.close("StatusDistribution")?;

    doc.close("Statistics")
}

/// Thin wrapper mapping quick-xml errors into [`ExportError`]
struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::encode(ExportFormat::Xml, e))
    }

    fn open(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn open_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(name);
        for &attribute in attributes {
            start.push_attribute(attribute);
        }
        self.event(Event::Start(start))
    }

    fn empty_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut element = BytesStart::new(name);
        for &attribute in attributes {
            element.push_attribute(attribute);
        }
        self.event(Event::Empty(element))
    }

    fn close(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<(), ExportError> {
        self.open(name)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
