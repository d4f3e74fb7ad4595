use crate::models::{FileSet, TaskRequest};
use crate::services::attachments::decode_attachment;
use tracing::{info, warn};

pub const INDEX_PATH: &str = "index.html";
pub const README_PATH: &str = "README.md";
pub const LICENSE_PATH: &str = "LICENSE";

const RESERVED_PATHS: [&str; 3] = [INDEX_PATH, README_PATH, LICENSE_PATH];

/// Assembles everything committed for one job: the generated page, README,
/// LICENSE and every attachment that decodes cleanly to non-empty text.
pub fn build_file_set(request: &TaskRequest, html: String, year: i32) -> FileSet {
    let mut files = FileSet::new();
    files.insert(INDEX_PATH, html);
    files.insert(README_PATH, readme(&request.task, &request.brief));
    files.insert(LICENSE_PATH, mit_license(year));

    for attachment in &request.attachments {
        if !is_publishable_path(&attachment.name) {
            warn!("Skipping attachment with unusable name: {:?}", attachment.name);
            continue;
        }
        match decode_attachment(attachment) {
            Some(content) if content.is_empty() => {
                warn!("Skipping empty attachment: {}", attachment.name);
            }
            Some(content) => {
                files.insert(attachment.name.clone(), content);
                info!("Added attachment: {}", attachment.name);
            }
            None => {}
        }
    }

    files
}

pub fn commit_message(request: &TaskRequest) -> String {
    format!("Round {}: {}", request.round, request.brief)
}

/// Relative path that stays inside the repository and leaves the generated files alone.
fn is_publishable_path(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.contains('\\')
        && !RESERVED_PATHS.contains(&name)
        && name
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

fn readme(task: &str, brief: &str) -> String {
    format!(
        "# Project: {task}\n\
         \n\
         ## Summary\n\
         This project was generated automatically in response to the brief:\n\
         \n\
         > {brief}\n\
         \n\
         ## Usage\n\
         This is a static site. The deployed version is served by GitHub Pages.\n\
         \n\
         ## Code Explanation\n\
         `index.html` is a self-contained page generated by an LLM. Any attachments,\n\
         such as `data.csv`, sit next to it and are fetched by the page at runtime.\n\
         \n\
         ## License\n\
         This project is licensed under the MIT License. See `LICENSE`.\n"
    )
}

fn mit_license(year: i32) -> String {
    format!(
        "MIT License\n\
         \n\
         Copyright (c) {year}\n\
         \n\
         Permission is hereby granted, free of charge, to any person obtaining a copy\n\
         of this software and associated documentation files (the \"Software\"), to deal\n\
         in the Software without restriction, including without limitation the rights\n\
         to use, copy, modify, merge, publish, distribute, sublicense, and/or sell\n\
         copies of the Software, and to permit persons to whom the Software is\n\
         furnished to do so, subject to the following conditions:\n\
         \n\
         The above copyright notice and this permission notice shall be included in all\n\
         copies or substantial portions of the Software.\n\
         \n\
         THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR\n\
         IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,\n\
         FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE\n\
         AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER\n\
         LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,\n\
         OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE\n\
         SOFTWARE.\n"
    )
}
