//! Structured verification report, renderable as text or a table.

use edam_model::Edam;
use serde::Serialize;

/// One rule violation, tied to the path that exposes it.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    /// The offending path, one `source operation -> target` step per
    /// entry.
    pub path: Vec<String>,
    pub description: String,
}

impl Issue {
    /// Build an issue for a path of transition indices.
    pub fn on_path(edam: &Edam, path: &[usize], description: String) -> Issue {
        let steps = path
            .iter()
            .map(|&i| {
                let t = &edam.transitions[i];
                format!("{} {} -> {}", t.source_state, t.operation, t.target_state)
            })
            .collect();
        Issue {
            path: steps,
            description,
        }
    }
}

/// Aggregate verification outcome. `ok` is true iff no rule fired on
/// any enumerated path.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub ok: bool,
    pub issues: Vec<Issue>,
    pub paths_explored: usize,
    pub truncated: bool,
}

impl VerifyReport {
    /// Plain-text rendering, one issue per line with its path.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.ok {
            out.push_str(&format!(
                "ok: {} paths explored, no role-safety issues\n",
                self.paths_explored
            ));
        } else {
            out.push_str(&format!(
                "failed: {} issue(s) across {} paths\n",
                self.issues.len(),
                self.paths_explored
            ));
            for issue in &self.issues {
                out.push_str(&format!(
                    "- {} [path: {}]\n",
                    issue.description,
                    issue.path.join(", ")
                ));
            }
        }
        if self.truncated {
            out.push_str("warning: path enumeration truncated at the configured ceiling\n");
        }
        out
    }

    /// Two-column table rendering: path | issue.
    pub fn render_table(&self) -> String {
        let mut rows = vec![("PATH".to_string(), "ISSUE".to_string())];
        for issue in &self.issues {
            rows.push((issue.path.join(", "), issue.description.clone()));
        }

        let path_width = rows.iter().map(|(p, _)| p.len()).max().unwrap_or(4);
        let mut out = String::new();
        for (i, (path, description)) in rows.iter().enumerate() {
            out.push_str(&format!("{:<width$}  {}\n", path, description, width = path_width));
            if i == 0 {
                out.push_str(&format!("{}\n", "-".repeat(path_width + 2 + 5)));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ok: bool) -> VerifyReport {
        VerifyReport {
            ok,
            issues: if ok {
                vec![]
            } else {
                vec![Issue {
                    path: vec!["q0 act -> q1".to_string()],
                    description: "role 'R' for participant 'b' used before granted".to_string(),
                }]
            },
            paths_explored: 1,
            truncated: false,
        }
    }

    #[test]
    fn test_text_rendering() {
        let ok = report(true).render_text();
        assert!(ok.starts_with("ok: 1 paths explored"));

        let failed = report(false).render_text();
        assert!(failed.starts_with("failed: 1 issue(s)"));
        assert!(failed.contains("[path: q0 act -> q1]"));
    }

    #[test]
    fn test_truncation_warning() {
        let mut r = report(true);
        r.truncated = true;
        assert!(r.render_text().contains("truncated"));
    }

    #[test]
    fn test_table_has_header_and_row() {
        let table = report(false).render_table();
        let mut lines = table.lines();
        assert!(lines.next().unwrap().starts_with("PATH"));
        assert!(lines.next().unwrap().starts_with("---"));
        assert!(table.contains("q0 act -> q1"));
    }
}
