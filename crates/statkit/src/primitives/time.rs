//! Time specifications for dated series.
//!
//! A time specification declares how consecutive observations are dated and,
//! for seasonal calendars, how many observations make up one cycle.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use serde::Serialize;

/// How the rows of a series are dated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TimeSpecification {
    /// No dates defined.
    #[default]
    NotDated,
    /// One observation per year.
    Years,
    /// Years with quarters.
    YearsQuarters,
    /// Years with months.
    YearsMonths,
    /// One observation per day.
    Days,
    /// Weeks with seven days.
    WeeksDays,
    /// Weeks with five work days.
    WeeksWorkDays5,
    /// Weeks with six work days.
    WeeksWorkDays6,
    /// One observation per hour.
    Hours,
    /// Days with 24 hours.
    DaysHours,
    /// Days with eight work hours.
    DaysWorkHours8,
    /// Hours with minutes.
    Minutes,
}

impl TimeSpecification {
    /// Observations per seasonal cycle, when the calendar defines one.
    pub fn periodicity(self) -> Option<usize> {
        match self {
            Self::NotDated | Self::Years | Self::Days | Self::Hours => None,
            Self::YearsQuarters => Some(4),
            Self::YearsMonths => Some(12),
            Self::WeeksDays => Some(7),
            Self::WeeksWorkDays5 => Some(5),
            Self::WeeksWorkDays6 => Some(6),
            Self::DaysHours => Some(24),
            Self::DaysWorkHours8 => Some(8),
            Self::Minutes => Some(60),
        }
    }

    /// Whether rows carry dates at all.
    pub fn is_dated(self) -> bool {
        self != Self::NotDated
    }

    /// Name of the seasonal period, e.g. "Month".
    pub fn period_name(self) -> &'static str {
        match self {
            Self::NotDated => "None",
            Self::Years => "Year",
            Self::YearsQuarters => "Quarter",
            Self::YearsMonths => "Month",
            Self::Days => "Day",
            Self::WeeksDays | Self::WeeksWorkDays5 | Self::WeeksWorkDays6 => "Day",
            Self::Hours | Self::DaysHours | Self::DaysWorkHours8 => "Hour",
            Self::Minutes => "Minute",
        }
    }
}

impl Display for TimeSpecification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            Self::NotDated => "Not dated",
            Self::Years => "Years",
            Self::YearsQuarters => "Years, quarters",
            Self::YearsMonths => "Years, months",
            Self::Days => "Days",
            Self::WeeksDays => "Weeks, days",
            Self::WeeksWorkDays5 => "Weeks, work days (5)",
            Self::WeeksWorkDays6 => "Weeks, work days (6)",
            Self::Hours => "Hours",
            Self::DaysHours => "Days, hours",
            Self::DaysWorkHours8 => "Days, work hours (8)",
            Self::Minutes => "Hours, minutes",
        };
        write!(f, "{}", s)
    }
}
