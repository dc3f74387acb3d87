//! Text for `newsum about` and the TUI's `?` overlay.

pub struct AboutSection {
    pub title: &'static str,
    pub body: &'static str,
}

pub const ABOUT_TITLE: &str = "About newsum";

pub const ABOUT_SECTIONS: &[AboutSection] = &[
    AboutSection {
        title: "Hourly updates",
        body: "The service summarizes fresh news every hour. Refresh to pick up the newest batch.",
    },
    AboutSection {
        title: "Reliable information",
        body: "Short AI-generated summaries of articles from trusted sources, so the key points are quick to take in.",
    },
    AboutSection {
        title: "Stay focused",
        body: "No endless scrolling. Read the essentials, stay current and get back to your day.",
    },
    AboutSection {
        title: "Clean and simple",
        body: "Headlines on the left, the summary on the right, nothing else in the way.",
    },
];

/// Title, then one blank-line separated block per section.
pub fn about_text() -> String {
    let mut out = String::from(ABOUT_TITLE);
    for section in ABOUT_SECTIONS {
        out.push_str("\n\n");
        out.push_str(section.title);
        out.push('\n');
        out.push_str(section.body);
    }
    out.push('\n');
    out
}
