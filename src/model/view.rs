use chrono::{DateTime, Datelike, Local, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::todo::Priority;

/// The instant a view is evaluated at, plus the calendar conventions used to
/// turn it into day and week boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalInstant {
    pub now: DateTime<Utc>,
    pub week_start: Weekday,
}

impl EvalInstant {
    /// Evaluate at `now` with weeks starting on Sunday
    pub fn at(now: DateTime<Utc>) -> Self {
        EvalInstant {
            now,
            week_start: Weekday::Sun,
        }
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Local calendar date of the evaluation instant
    pub fn today(&self) -> NaiveDate {
        local_date(self.now)
    }

    /// First day of the week containing today
    pub fn week_start_date(&self) -> NaiveDate {
        let today = self.today();
        let back = (7 + today.weekday().num_days_from_sunday()
            - self.week_start.num_days_from_sunday())
            % 7;
        today - chrono::Days::new(u64::from(back))
    }
}

/// Local calendar date of a stored instant
pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Status classes understood by the status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Completed,
    Pending,
    Overdue,
}

impl StatusFilter {
    pub fn parse_status(s: &str) -> Option<StatusFilter> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" | "done" => Some(StatusFilter::Completed),
            "pending" | "open" => Some(StatusFilter::Pending),
            "overdue" => Some(StatusFilter::Overdue),
            _ => None,
        }
    }
}

/// Named date windows for the date-range filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateRange {
    Today,
    ThisWeek,
    ThisMonth,
    Overdue,
    Upcoming,
    #[default]
    All,
}

impl DateRange {
    pub fn parse_range(s: &str) -> Option<DateRange> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "today" => Some(DateRange::Today),
            "thisweek" | "week" => Some(DateRange::ThisWeek),
            "thismonth" | "month" => Some(DateRange::ThisMonth),
            "overdue" => Some(DateRange::Overdue),
            "upcoming" => Some(DateRange::Upcoming),
            "all" => Some(DateRange::All),
            _ => None,
        }
    }

    pub fn is_all(&self) -> bool {
        *self == DateRange::All
    }
}

/// Declarative filter. Every empty field imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<StatusFilter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub priority: Vec<Priority>,
    /// Project labels; `No Project` selects todos without a project
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(default, skip_serializing_if = "DateRange::is_all")]
    pub date_range: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
            && self.priority.is_empty()
            && self.projects.is_empty()
            && self.date_range.is_all()
            && self.search_text.as_deref().is_none_or(str::is_empty)
    }

    /// Overlay `other` on `self`: every field `other` constrains replaces the
    /// corresponding field of `self`, and the rest are kept. Only when the two
    /// constrain disjoint fields is the result their conjunction.
    pub fn merge(mut self, other: FilterConfig) -> FilterConfig {
        if !other.status.is_empty() {
            self.status = other.status;
        }
        if !other.priority.is_empty() {
            self.priority = other.priority;
        }
        if !other.projects.is_empty() {
            self.projects = other.projects;
        }
        if !other.date_range.is_all() {
            self.date_range = other.date_range;
        }
        if other.search_text.as_deref().is_some_and(|s| !s.is_empty()) {
            self.search_text = other.search_text;
        }
        self
    }
}

/// A single grouping dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupLevel {
    Status,
    Priority,
    Project,
    Date,
}

impl GroupLevel {
    pub fn parse_level(s: &str) -> Option<GroupLevel> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Some(GroupLevel::Status),
            "priority" => Some(GroupLevel::Priority),
            "project" => Some(GroupLevel::Project),
            "date" => Some(GroupLevel::Date),
            _ => None,
        }
    }
}

impl std::fmt::Display for GroupLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupLevel::Status => "status",
            GroupLevel::Priority => "priority",
            GroupLevel::Project => "project",
            GroupLevel::Date => "date",
        };
        f.write_str(s)
    }
}

/// One to three nested grouping levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingConfig {
    pub primary: GroupLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<GroupLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<GroupLevel>,
}

impl GroupingConfig {
    pub fn single(primary: GroupLevel) -> Self {
        GroupingConfig {
            primary,
            secondary: None,
            tertiary: None,
        }
    }

    /// Build from an ordered list of levels. Returns `None` for an empty
    /// list; levels past the third are ignored.
    pub fn from_levels(levels: &[GroupLevel]) -> Option<Self> {
        let (&primary, rest) = levels.split_first()?;
        Some(GroupingConfig {
            primary,
            secondary: rest.first().copied(),
            tertiary: rest.get(1).copied(),
        })
    }

    /// Configured levels, outermost first. A tertiary level without a
    /// secondary one is skipped along with it.
    pub fn levels(&self) -> Vec<GroupLevel> {
        let mut levels = vec![self.primary];
        if let Some(secondary) = self.secondary {
            levels.push(secondary);
            if let Some(tertiary) = self.tertiary {
                levels.push(tertiary);
            }
        }
        levels
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig::single(GroupLevel::Status)
    }
}

/// Last-used view, persisted under the `view` key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub grouping: GroupingConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn week_start_defaults_to_sunday() {
        // 2024-01-10 is a Wednesday
        let at = EvalInstant::at(local(2024, 1, 10, 8));
        assert_eq!(at.week_start_date(), NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
        let monday = at.with_week_start(Weekday::Mon);
        assert_eq!(monday.week_start_date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn week_start_on_the_start_day_is_today() {
        let sunday = EvalInstant::at(local(2024, 1, 7, 8));
        assert_eq!(sunday.week_start_date(), sunday.today());
    }

    #[test]
    fn grouping_levels_skip_orphan_tertiary() {
        let config = GroupingConfig {
            primary: GroupLevel::Project,
            secondary: None,
            tertiary: Some(GroupLevel::Date),
        };
        assert_eq!(config.levels(), vec![GroupLevel::Project]);
    }

    #[test]
    fn grouping_from_levels_truncates() {
        let config = GroupingConfig::from_levels(&[
            GroupLevel::Status,
            GroupLevel::Priority,
            GroupLevel::Project,
            GroupLevel::Date,
        ])
        .unwrap();
        assert_eq!(
            config.levels(),
            vec![GroupLevel::Status, GroupLevel::Priority, GroupLevel::Project]
        );
        assert!(GroupingConfig::from_levels(&[]).is_none());
    }

    #[test]
    fn grouping_config_parses_primary_only() {
        let config: GroupingConfig = serde_json::from_str(r#"{"primary":"priority"}"#).unwrap();
        assert_eq!(config, GroupingConfig::single(GroupLevel::Priority));
    }

    #[test]
    fn filter_config_camel_case_round_trip() {
        let json = r#"{"status":["overdue"],"dateRange":"thisWeek","searchText":"rel"}"#;
        let filter: FilterConfig = serde_json::from_str(json).unwrap();
        assert_eq!(filter.status, vec![StatusFilter::Overdue]);
        assert_eq!(filter.date_range, DateRange::ThisWeek);
        assert_eq!(serde_json::to_string(&filter).unwrap(), json);
    }

    #[test]
    fn merge_takes_constrained_fields_from_other() {
        let base = FilterConfig {
            priority: vec![Priority::High],
            search_text: Some("ship".into()),
            ..Default::default()
        };
        let extra = FilterConfig {
            date_range: DateRange::Today,
            search_text: Some(String::new()),
            ..Default::default()
        };
        let merged = base.merge(extra);
        assert_eq!(merged.priority, vec![Priority::High]);
        assert_eq!(merged.date_range, DateRange::Today);
        assert_eq!(merged.search_text.as_deref(), Some("ship"));
    }

    #[test]
    fn merge_overrides_fields_both_constrain() {
        let saved = FilterConfig {
            status: vec![StatusFilter::Pending],
            projects: vec!["Work".into()],
            ..Default::default()
        };
        let given = FilterConfig {
            projects: vec!["Home".into()],
            ..Default::default()
        };
        let merged = saved.merge(given);
        assert_eq!(merged.projects, vec!["Home".to_string()]);
        assert_eq!(merged.status, vec![StatusFilter::Pending]);
    }

    #[test]
    fn parse_range_is_lenient_about_separators() {
        assert_eq!(DateRange::parse_range("this-week"), Some(DateRange::ThisWeek));
        assert_eq!(DateRange::parse_range("thisMonth"), Some(DateRange::ThisMonth));
        assert_eq!(DateRange::parse_range("someday"), None);
    }
}
