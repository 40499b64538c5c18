/*!
 * Reporting functionality for acadfs
 *
 * Renders listings either as console tables using the tabled library or as
 * JSON for scripting.
 */

use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::types::{MaterialDescriptor, StoredMaterial, TaxonomyPath, TreeSummary};
use crate::utils::format_file_size;

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for repository listings
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Render child node names found under `path`
    pub fn names(&self, path: &TaxonomyPath, names: &[String]) -> Result<String> {
        #[derive(Serialize)]
        struct Listing<'a> {
            path: &'a [String],
            level: Option<&'static str>,
            children: &'a [String],
        }

        match self.format {
            ReportFormat::Json => {
                let child_level = crate::types::TaxonomyLevel::at_depth(path.segments().len() + 1);
                to_json(&Listing {
                    path: path.segments(),
                    level: child_level.map(Into::into),
                    children: names,
                })
            }
            ReportFormat::ConsoleTable => {
                if names.is_empty() {
                    return Ok(format!("⚠️  Nothing found under {}", path));
                }

                #[derive(Tabled)]
                struct NameRow {
                    #[tabled(rename = "#")]
                    index: usize,
                    #[tabled(rename = "Name")]
                    name: String,
                }

                let rows = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| NameRow {
                        index: i + 1,
                        name: name.clone(),
                    })
                    .collect::<Vec<_>>();
                Ok(format!("📂  {}\n{}", path, styled(Table::new(rows))))
            }
        }
    }

    /// Render the materials of one year
    pub fn materials(&self, path: &TaxonomyPath, materials: &[MaterialDescriptor]) -> Result<String> {
        match self.format {
            ReportFormat::Json => to_json(&materials),
            ReportFormat::ConsoleTable => {
                if materials.is_empty() {
                    return Ok(format!("⚠️  No materials found for {}", path));
                }

                #[derive(Tabled)]
                struct MaterialRow {
                    #[tabled(rename = "Material")]
                    category: String,
                    #[tabled(rename = "File")]
                    name: String,
                    #[tabled(rename = "Size")]
                    size: String,
                    #[tabled(rename = "Preview")]
                    preview: String,
                    #[tabled(rename = "Modified")]
                    modified: String,
                }

                let rows = materials
                    .iter()
                    .map(|m| MaterialRow {
                        category: m.category.label(),
                        name: m.name.clone(),
                        size: format_file_size(m.size),
                        preview: m.preview.to_string(),
                        modified: m
                            .modified
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    })
                    .collect::<Vec<_>>();

                Ok(format!(
                    "🎯  Materials for {}\n{}",
                    path,
                    styled(Table::new(rows))
                ))
            }
        }
    }

    /// Render the outcome of an upload or replace
    pub fn stored(&self, action: &str, stored: &StoredMaterial) -> Result<String> {
        match self.format {
            ReportFormat::Json => to_json(stored),
            ReportFormat::ConsoleTable => Ok(format!(
                "✅  {} {} ({})",
                action,
                stored.name,
                format_file_size(stored.size)
            )),
        }
    }

    /// Render a whole-repository summary
    pub fn summary(&self, summary: &TreeSummary) -> Result<String> {
        if self.format == ReportFormat::Json {
            return to_json(summary);
        }

        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "🏛️ Branches".to_string(),
                value: self.format_number(summary.branches),
            },
            SummaryRow {
                key: "📅 Semesters".to_string(),
                value: self.format_number(summary.semesters),
            },
            SummaryRow {
                key: "📘 Subjects".to_string(),
                value: self.format_number(summary.subjects),
            },
            SummaryRow {
                key: "🗓️ Years".to_string(),
                value: self.format_number(summary.years),
            },
            SummaryRow {
                key: "📄 Materials".to_string(),
                value: self.format_number(summary.materials),
            },
            SummaryRow {
                key: "📦 Total Size".to_string(),
                value: format_file_size(summary.total_bytes),
            },
        ];

        if !summary.misplaced.is_empty() {
            rows.push(SummaryRow {
                key: "⚠️ Misplaced Entries".to_string(),
                value: self.format_number(summary.misplaced.len()),
            });
        }

        let mut output = format!("📊  REPOSITORY SUMMARY\n{}", styled(Table::new(rows)));
        for path in &summary.misplaced {
            output.push_str(&format!("\n  ⚠️  {}", path.display()));
        }
        Ok(output)
    }

    /// Print a rendered report to stdout
    pub fn print(&self, rendered: &str) {
        println!("{}", rendered);
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
