//! Text reports: daily brief, monthly list, status listings

use crate::store::{DecodedDocument, FolderStore, PendingSummary};
use chrono::NaiveDate;
use gym_common::Result;
use serde::Serialize;

const RULE_WIDTH: usize = 40;

/// How busy a day was, by number of new joiners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Activity {
    Quiet,
    Steady,
    Busy,
}

impl Activity {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Activity::Quiet,
            1 | 2 => Activity::Steady,
            _ => Activity::Busy,
        }
    }
}

/// Joiners of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBrief {
    pub date: NaiveDate,
    /// Names in folder order
    pub joiners: Vec<String>,
    /// Package name and count, in first-seen order
    pub packages: Vec<(String, usize)>,
}

impl DailyBrief {
    pub fn activity(&self) -> Activity {
        Activity::from_count(self.joiners.len())
    }

    /// Package chosen most often; the first seen wins a tie
    pub fn most_popular(&self) -> Option<&str> {
        self.packages
            .iter()
            .reduce(|best, p| if p.1 > best.1 { p } else { best })
            .map(|(name, _)| name.as_str())
    }

    pub fn render(&self) -> String {
        let rule = "-".repeat(RULE_WIDTH);
        let count = self.joiners.len();
        let mut lines = vec![
            format!("EVENING BRIEFING ({})", self.date.format("%B %d, %Y")),
            rule.clone(),
            String::new(),
        ];

        lines.push(match self.activity() {
            Activity::Quiet => {
                "Activity: It was a quiet day. No new memberships were recorded today.".to_string()
            }
            Activity::Steady => format!("Activity: Steady pace today. You had {} new joiners.", count),
            Activity::Busy => {
                format!("Activity: It was a busy day! You welcomed {} new members.", count)
            }
        });
        lines.push(String::new());

        if count > 0 {
            if let Some(package) = self.most_popular() {
                lines.push(format!(
                    "Most Popular: The majority of people today chose the {} package.",
                    package
                ));
                lines.push(String::new());
            }
            lines.push("New Joiners:".to_string());
            lines.extend(self.joiners.iter().map(|name| format!(" • {}", name)));
        }

        lines.push(String::new());
        lines.push(rule);
        lines.push("End of Report.".to_string());
        lines.join("\n")
    }
}

/// Brief for the members whose folders sit under `date`
pub fn daily_brief(store: &FolderStore, date: NaiveDate) -> Result<DailyBrief> {
    let mut joiners = Vec::new();
    let mut packages: Vec<(String, usize)> = Vec::new();

    for record in store.members_joined_on(date)? {
        let name = if record.name.trim().is_empty() {
            "Unknown Member".to_string()
        } else {
            record.name
        };
        joiners.push(name);

        let package = record
            .package
            .map(|p| p.to_string())
            .unwrap_or_else(|| "Unknown Package".to_string());
        match packages.iter_mut().find(|(name, _)| *name == package) {
            Some((_, count)) => *count += 1,
            None => packages.push((package, 1)),
        }
    }

    tracing::debug!(date = %date, joiners = joiners.len(), "Built daily brief");
    Ok(DailyBrief {
        date,
        joiners,
        packages,
    })
}

/// Monthly log lines as one block of text
pub fn render_monthly_list(lines: &[String]) -> String {
    if lines.is_empty() {
        "No new members recorded this month.".to_string()
    } else {
        lines.join("\n")
    }
}

/// `"{id} — {name} — Status: {status}"` per member
pub fn render_status_list(documents: &[DecodedDocument]) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "{} — {} — Status: {}",
                doc.record.id,
                doc.record.name,
                doc.record.status_label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_pending(pending: &[PendingSummary]) -> String {
    pending
        .iter()
        .map(|p| {
            let joined = p
                .join_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "N/A".to_string());
            format!("{} — {} — {} — joined {}", p.id, p.name, p.gender, joined)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DocumentEntry;
    use gym_common::{MemberRecord, Status};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()
    }

    fn brief(joiners: &[&str], packages: &[(&str, usize)]) -> DailyBrief {
        DailyBrief {
            date: date(),
            joiners: joiners.iter().map(|s| s.to_string()).collect(),
            packages: packages.iter().map(|(p, n)| (p.to_string(), *n)).collect(),
        }
    }

    #[test]
    fn test_activity_thresholds() {
        assert_eq!(Activity::from_count(0), Activity::Quiet);
        assert_eq!(Activity::from_count(2), Activity::Steady);
        assert_eq!(Activity::from_count(3), Activity::Busy);
    }

    #[test]
    fn test_most_popular_first_seen_wins_tie() {
        let b = brief(&["A", "B", "C"], &[("Silver", 1), ("Gold", 2), ("Bronze", 2)]);
        assert_eq!(b.most_popular(), Some("Gold"));
    }

    #[test]
    fn test_render_quiet_day() {
        let text = brief(&[], &[]).render();
        assert!(text.starts_with("EVENING BRIEFING (March 05, 2025)"));
        assert!(text.contains("quiet day"));
        assert!(!text.contains("New Joiners"));
    }

    #[test]
    fn test_render_busy_day_lists_names() {
        let text = brief(&["Ali", "Sana", "Omar"], &[("Gold", 3)]).render();
        assert!(text.contains("welcomed 3 new members"));
        assert!(text.contains("chose the Gold package"));
        assert!(text.contains(" • Sana"));
    }

    #[test]
    fn test_render_status_list() {
        let mut record = MemberRecord::new("G-1", "Ali", date());
        record.status = Some(Status::Banned);
        let docs = vec![DecodedDocument {
            entry: DocumentEntry {
                path: PathBuf::from("G-1.card"),
                stem: "G-1".to_string(),
                modified: SystemTime::UNIX_EPOCH,
            },
            record,
        }];
        assert_eq!(render_status_list(&docs), "G-1 — Ali — Status: Banned");
    }

    #[test]
    fn test_render_empty_monthly_list() {
        assert_eq!(render_monthly_list(&[]), "No new members recorded this month.");
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(render_monthly_list(&lines), "a\nb");
    }
}
