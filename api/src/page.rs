//! HTML for the single chat page.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::session::Speaker;
use crate::view::{BannerLevel, PageView};

pub const HEADER: &str = "Context remembering AI chat with RAG";
pub const DESCRIPTION: &str = "Upload a PDF document and query the knowledge it contains. \
This app uses the document content and LLM-generated information to answer your queries. \
Supported file types: PDF file.";

pub const INSTRUCTIONS: [&str; 5] = [
    "Upload any PDF file using the file uploader.",
    "Click 'Load Documents and Initialize Chat' to start.",
    "Type your question and press Enter.",
    "Type 'exit' to end the chat.",
    "Delete and upload a new file to reset the chat.",
];

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:18rem;padding:1rem;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:1rem 2rem;max-width:50rem}\
.banner{padding:.6rem 1rem;margin:.4rem 0;border-radius:.4rem}\
.success{background:#dff3e3;color:#14532d}.error{background:#fde2e1;color:#7f1d1d}\
.chat{border:1px solid #ccc;border-radius:.5rem;padding:1rem;margin-top:1rem}\
form{margin:.6rem 0}";

pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n<style>{}</style>\n", HEADER, STYLE));
    html.push_str("</head>\n<body>\n");

    html.push_str(&instructions_panel());
    html.push_str("<main>\n");
    html.push_str(&format!("<h1>{}</h1>\n<p>{}</p>\n", HEADER, DESCRIPTION));

    for banner in &view.banners {
        let class = match banner.level {
            BannerLevel::Success => "success",
            BannerLevel::Error => "error",
        };
        html.push_str(&format!(
            "<div class=\"banner {}\">{}</div>\n",
            class,
            encode_text(&banner.message)
        ));
    }

    if !view.halted {
        html.push_str(&upload_section(view));
        html.push_str(&chat_section(view));
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn instructions_panel() -> String {
    let mut html = String::from("<aside>\n<h3>Instructions</h3>\n<ol>\n");
    for step in INSTRUCTIONS {
        html.push_str(&format!("<li>{}</li>\n", encode_text(step)));
    }
    html.push_str("</ol>\n</aside>\n");
    html
}

fn upload_section(view: &PageView) -> String {
    let mut html = String::from("<section>\n<h3>Upload a file</h3>\n");

    match &view.file_name {
        Some(name) => {
            html.push_str(&format!(
                "<p>Current file: <strong>{}</strong></p>\n",
                encode_text(name)
            ));
            html.push_str(
                "<form method=\"post\" action=\"/remove\"><button type=\"submit\">Remove file</button></form>\n",
            );
        }
        None => html.push_str("<p>No file uploaded.</p>\n"),
    }

    html.push_str(
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
<input type=\"file\" name=\"file\" required> <button type=\"submit\">Upload</button></form>\n",
    );

    let disabled = if view.initialize_enabled { "" } else { " disabled" };
    html.push_str(&format!(
        "<form method=\"post\" action=\"/initialize\"><button type=\"submit\"{}>Load Documents and Initialize Chat</button></form>\n",
        disabled
    ));

    html.push_str("</section>\n");
    html
}

fn chat_section(view: &PageView) -> String {
    if !view.chat_active && view.transcript.is_empty() {
        return String::new();
    }

    let mut html = String::from("<section class=\"chat\">\n");
    if view.chat_active {
        html.push_str("<h3>Chat with the AI</h3>\n");
    }

    for entry in &view.transcript {
        let speaker = match entry.speaker {
            Speaker::User => "You",
            Speaker::Assistant => "AI",
        };
        html.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            speaker,
            encode_text(&entry.text)
        ));
    }

    if view.chat_active {
        html.push_str(&format!(
            "<form method=\"post\" action=\"/chat\"><input type=\"text\" name=\"message\" placeholder=\"{}\" autofocus required> <button type=\"submit\">Send</button></form>\n",
            encode_double_quoted_attribute("Your message")
        ));
    }

    html.push_str("</section>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TranscriptEntry;
    use crate::view::Banner;

    fn view() -> PageView {
        PageView {
            halted: false,
            banners: Vec::new(),
            file_name: None,
            documents_loaded: 0,
            initialize_enabled: false,
            chat_active: false,
            transcript: Vec::new(),
        }
    }

    #[test]
    fn initialize_button_is_disabled_without_a_file() {
        let html = render_page(&view());
        assert!(html.contains("<button type=\"submit\" disabled>Load Documents and Initialize Chat</button>"));
        assert!(!html.contains("action=\"/chat\""));
    }

    #[test]
    fn transcript_is_escaped_and_labelled() {
        let mut view = view();
        view.chat_active = true;
        view.transcript = vec![
            TranscriptEntry {
                speaker: Speaker::User,
                text: "<script>alert(1)</script>".to_string(),
            },
            TranscriptEntry {
                speaker: Speaker::Assistant,
                text: "30 days & counting".to_string(),
            },
        ];

        let html = render_page(&view);

        assert!(html.contains("<strong>You:</strong> &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<strong>AI:</strong> 30 days &amp; counting"));
        assert!(html.contains("action=\"/chat\""));
    }

    #[test]
    fn halted_page_shows_only_the_error() {
        let html = render_page(&PageView::halted("OPENAI_API_KEY not found"));
        assert!(html.contains("banner error\">OPENAI_API_KEY not found"));
        assert!(!html.contains("action=\"/upload\""));
        assert!(html.contains("Instructions"));
    }

    #[test]
    fn banners_keep_their_order() {
        let mut view = view();
        view.banners = vec![Banner::success("first"), Banner::error("second")];
        let html = render_page(&view);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
    }
}
