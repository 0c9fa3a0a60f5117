#![allow(dead_code)]

use httpmock::MockServer;
use std::fmt::Write;
use tempfile::TempDir;
use trivia_ingest::Config;

pub const TITLE: &str = "Show #8045 - Monday, May 6, 2019";
pub const NOTES: &str = "Tournament of Champions quarterfinal game 1.";

/// Builder for episode pages in the archive's markup.
#[derive(Debug, Clone)]
pub struct PageFixture {
    pub title: Option<String>,
    pub extra_round: bool,
    /// (round, column, row) whose clue cell is left unrevealed.
    pub missing_prompt: Option<(usize, usize, usize)>,
    /// (round, column, row, wager).
    pub daily_doubles: Vec<(usize, usize, usize, u32)>,
    pub final_prompt: bool,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            title: Some(TITLE.to_string()),
            extra_round: false,
            missing_prompt: None,
            daily_doubles: Vec::new(),
            final_prompt: true,
        }
    }
}

const VALUES: [[u32; 5]; 2] = [[200, 400, 600, 800, 1000], [400, 800, 1200, 1600, 2000]];

impl PageFixture {
    pub fn render(&self) -> String {
        let mut html = String::from("<html><head><title>Show</title></head><body>\n");
        if let Some(title) = &self.title {
            writeln!(html, r#"<div id="game_title"><h1>{title}</h1></div>"#).unwrap();
        }
        writeln!(html, r#"<div id="game_comments">{NOTES}</div>"#).unwrap();

        if self.extra_round {
            self.render_round(&mut html, "X", "Extra", None);
        }
        self.render_round(&mut html, "J", "J", Some(0));
        self.render_round(&mut html, "DJ", "DJ", Some(1));
        self.render_final(&mut html);

        html.push_str("</body></html>\n");
        html
    }

    fn render_round(&self, html: &mut String, prefix: &str, label: &str, round: Option<usize>) {
        writeln!(html, r#"<div id="{prefix}_round"><table class="round">"#).unwrap();
        html.push_str("<tr>");
        for c in 0..6 {
            write!(
                html,
                r#"<td class="category"><table><tr><td class="category_name">{label} Cat {c}</td></tr></table></td>"#
            )
            .unwrap();
        }
        html.push_str("</tr>\n");

        for r in 0..5 {
            html.push_str("<tr>");
            for c in 0..6 {
                if round.is_some() && self.missing_prompt == round.map(|i| (i, c, r)) {
                    html.push_str(r#"<td class="clue"></td>"#);
                    continue;
                }
                let wager = round.and_then(|i| {
                    self.daily_doubles
                        .iter()
                        .find(|(dr, dc, drow, _)| (*dr, *dc, *drow) == (i, c, r))
                        .map(|d| d.3)
                });
                let value_cell = match wager {
                    Some(w) => format!(
                        r#"<td class="clue_value_daily_double">DD: ${}</td>"#,
                        with_commas(w)
                    ),
                    None => format!(
                        r#"<td class="clue_value">${}</td>"#,
                        VALUES[round.unwrap_or(0)][r]
                    ),
                };
                let responses = match c {
                    0 => r#"<td class="wrong">Triple Stumper</td>"#,
                    1 => r#"<td class="wrong">Alice</td><td class="right">Bob</td>"#,
                    _ => r#"<td class="right">Carol</td>"#,
                };
                write!(
                    html,
                    concat!(
                        r#"<td class="clue"><table>"#,
                        r#"<tr><td><table class="clue_header"><tr>{value}</tr></table></td></tr>"#,
                        r#"<tr><td id="clue_{p}_{c1}_{r1}" class="clue_text">{label} prompt {c}-{r}</td></tr>"#,
                        r#"<tr><td id="clue_{p}_{c1}_{r1}_r" class="clue_text" style="display:none;">"#,
                        r#"<em class="correct_response">{label} answer {c}-{r}</em><br />"#,
                        r#"<table width="100%"><tr>{responses}</tr></table></td></tr>"#,
                        r#"</table></td>"#
                    ),
                    value = value_cell,
                    p = prefix,
                    c1 = c + 1,
                    r1 = r + 1,
                    label = label,
                    c = c,
                    r = r,
                    responses = responses,
                )
                .unwrap();
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table></div>\n");
    }

    fn render_final(&self, html: &mut String) {
        html.push_str(r#"<div id="final_jeopardy_round"><table class="final_round">"#);
        html.push_str(
            r#"<tr><td class="category"><table><tr><td class="category_name">WORLD CAPITALS</td></tr></table></td></tr>"#,
        );
        html.push_str(r#"<tr><td class="clue"><table>"#);
        if self.final_prompt {
            html.push_str(r#"<tr><td id="clue_FJ" class="clue_text">Final prompt</td></tr>"#);
        }
        html.push_str(
            r#"<tr><td id="clue_FJ_r" class="clue_text_response" style="display:none;"><em class="correct_response">Ottawa</em></td></tr>"#,
        );
        html.push_str("</table></td></tr></table></div>\n");
    }
}

fn with_commas(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// CSV text of a filled-in spreadsheet template.
pub fn sheet_csv(round_one_marker: &str, round_two_marker: &str) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (round, header) in [0usize, 13].into_iter().enumerate() {
        while rows.len() < header {
            rows.push(vec![String::new(); 8]);
        }
        let marker = if round == 0 { round_one_marker } else { round_two_marker };
        let mut head = vec![String::new()];
        head.extend((0..6).map(|c| format!("Sheet R{round} Cat {c}")));
        head.push(marker.to_string());
        rows.push(head);
        for row in 0..5 {
            let mut r = vec![VALUES[round][row].to_string()];
            r.extend((0..6).map(|c| format!("Sheet R{round} prompt {c}-{row}")));
            rows.push(r);
        }
        rows.push(vec![String::new(); 7]);
        for row in 0..5 {
            let mut r = vec![String::new()];
            r.extend((0..6).map(|c| format!("Sheet R{round} answer {c}-{row}")));
            rows.push(r);
        }
    }
    rows.push(vec![String::new(); 8]);
    rows.push(
        ["", "Final Sheet Cat", "Final sheet prompt", "Final sheet answer", "", "January 2 2021", "", "Office party"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );

    let mut csv = String::new();
    for row in rows {
        csv.push_str(&row.join(","));
        csv.push_str("\r\n");
    }
    csv
}

/// Config pointed at a mock server with temporary cache and media dirs.
pub fn config(server: &MockServer, cache: &TempDir, media: &TempDir) -> Config {
    Config {
        cache_dir: cache.path().to_path_buf(),
        media_root: media.path().to_path_buf(),
        page_base_url: server.base_url(),
        archive_base_url: server.base_url(),
        sheet_base_url: server.base_url(),
        request_timeout_secs: 5,
        batch_delay_ms: 0,
        ..Config::default()
    }
}
