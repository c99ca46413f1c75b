use crate::output::{OutputError, OutputHandler, OutputResult};
use crate::state::LinkGraph;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const INTERMEDIATE_JSON: &str = "crawl_results_intermediate.json";
pub const FINAL_JSON: &str = "crawl_results_final.json";
pub const FINAL_CSV: &str = "crawl_results_final.csv";

const CSV_HEADER: [&str; 4] = ["source_url", "target_url", "link_text", "is_external"];

/// Writes crawl artifacts into an output directory
#[derive(Debug, Clone)]
pub struct FileOutputHandler {
    output_dir: PathBuf,
}

impl FileOutputHandler {
    /// Creates the handler, creating the output directory if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> OutputResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_json(&self, file_name: &str, graph: &LinkGraph) -> OutputResult<PathBuf> {
        let path = self.output_dir.join(file_name);
        write_atomic(&path, &serde_json::to_vec_pretty(graph)?)?;
        Ok(path)
    }
}

impl OutputHandler for FileOutputHandler {
    fn save_intermediate(&mut self, graph: &LinkGraph) -> OutputResult<()> {
        let path = self.write_json(INTERMEDIATE_JSON, graph)?;
        tracing::debug!(
            "Saved intermediate results ({} pages) to {}",
            graph.len(),
            path.display()
        );
        Ok(())
    }

    fn save_final(&mut self, graph: &LinkGraph) -> OutputResult<()> {
        let json_path = self.write_json(FINAL_JSON, graph)?;

        let csv_path = self.output_dir.join(FINAL_CSV);
        write_atomic(&csv_path, &link_graph_csv(graph)?)?;

        tracing::info!(
            "Saved final results to {} and {}",
            json_path.display(),
            csv_path.display()
        );
        Ok(())
    }
}

/// Renders the graph as one CSV row per (source page, outlink) pair
pub fn link_graph_csv(graph: &LinkGraph) -> OutputResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(CSV_HEADER)?;

    for (source_url, outlinks) in graph.iter() {
        for outlink in outlinks {
            writer.write_record([
                source_url,
                outlink.absolute_url.as_str(),
                outlink.text.as_str(),
                if outlink.is_external { "true" } else { "false" },
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| OutputError::Io(e.into_error()))
}

/// Replaces `path` with `contents` without ever exposing a partial file
///
/// The data goes to a hidden sibling first and is renamed into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", path.display()),
        )
    })?;

    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)
}
