// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Static resume content published next to the project list.
//!
//! The types mirror the `profile` section of a portfolio document. Nothing in
//! here is enriched; the data is validated once at load time and then served
//! as-is.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Upper bound for [`Skill::level`].
pub const MAX_SKILL_LEVEL: u8 = 100;

/// Resume content of the portfolio owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Profile
{
    /// Contact details.
    pub contact:     Contact,
    /// Work history, most recent first.
    #[serde(default)]
    pub experiences: Vec<Experience,>,
    /// Technologies with self-assessed proficiency.
    #[serde(default)]
    pub skills:      Vec<Skill,>,
    /// Formal education.
    #[serde(default)]
    pub educations:  Vec<Education,>,
    /// Spoken languages.
    #[serde(default)]
    pub languages:   Vec<Language,>,
}

impl Profile
{
    /// Checks invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the contact email is blank, a skill
    /// level exceeds [`MAX_SKILL_LEVEL`], or a role ends before it starts or
    /// is both finished and marked current.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.contact.email.trim().is_empty() {
            return Err(Error::validation("profile.contact.email cannot be empty",),);
        }

        for skill in &self.skills {
            if skill.level > MAX_SKILL_LEVEL {
                return Err(Error::validation(format!(
                    "skill '{}' level {} exceeds {MAX_SKILL_LEVEL}",
                    skill.title, skill.level
                ),),);
            }
        }

        for experience in &self.experiences {
            for role in &experience.roles {
                role.period.validate(&experience.company, &role.job_title,)?;
            }
        }

        Ok((),)
    }
}

/// Contact channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Contact
{
    /// Primary email address. Must not be blank.
    pub email:    String,
    /// Phone number in display form.
    #[serde(default)]
    pub phone:    Option<String,>,
    /// LinkedIn account.
    #[serde(default)]
    pub linkedin: Option<Social,>,
    /// GitHub account.
    #[serde(default)]
    pub github:   Option<Social,>,
    /// Twitter account.
    #[serde(default)]
    pub twitter:  Option<Social,>,
}

/// Account on a social platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Social
{
    /// Handle on the platform.
    #[serde(alias = "userName")]
    pub user_name: String,
    /// Profile URL.
    pub link:      String,
}

/// Employment at one company, possibly spanning several roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Experience
{
    /// Employer name.
    pub company:      String,
    /// Employer website.
    #[serde(default, alias = "companyLink")]
    pub company_link: Option<String,>,
    /// Image reference for the employer logo.
    #[serde(default)]
    pub logo:         Option<String,>,
    /// Roles held, most recent first.
    #[serde(default)]
    pub roles:        Vec<Role,>,
}

/// Position held at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Role
{
    /// Position name.
    #[serde(alias = "jobTitle")]
    pub job_title: String,
    /// When the role was held.
    #[serde(alias = "time")]
    pub period:    Period,
    /// Achievements and responsibilities, one per entry.
    #[serde(default)]
    pub details:   Vec<String,>,
}

/// Time span of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Period
{
    /// First month of the role.
    pub start:   YearMonth,
    /// Last month of the role, absent while ongoing.
    #[serde(default)]
    pub end:     Option<YearMonth,>,
    /// Whether the role is ongoing. Excludes an end date.
    #[serde(default)]
    pub current: bool,
}

impl Period
{
    fn validate(&self, company: &str, job_title: &str,) -> Result<(), Error,>
    {
        match self.end {
            Some(end,) if end < self.start => Err(Error::validation(format!(
                "role '{job_title}' at '{company}' ends ({end}) before it starts ({})",
                self.start
            ),),),
            Some(_,) if self.current => Err(Error::validation(format!(
                "role '{job_title}' at '{company}' cannot have an end date and be current"
            ),),),
            _ => Ok((),),
        }
    }
}

/// Calendar month written as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,)]
pub struct YearMonth
{
    year:  u16,
    month: u8,
}

impl YearMonth
{
    /// Creates a month, rejecting values outside `1..=12`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an out-of-range month.
    pub fn new(year: u16, month: u8,) -> Result<Self, Error,>
    {
        if !(1..=12).contains(&month,) {
            return Err(Error::validation(format!("month {month} is outside 1..=12"),),);
        }
        Ok(Self {
            year, month,
        },)
    }

    /// Calendar year.
    pub fn year(self,) -> u16
    {
        self.year
    }

    /// Month in `1..=12`.
    pub fn month(self,) -> u8
    {
        self.month
    }
}

impl FromStr for YearMonth
{
    type Err = Error;

    fn from_str(value: &str,) -> Result<Self, Self::Err,>
    {
        let (year, month,) = value
            .trim()
            .split_once('-',)
            .ok_or_else(|| Error::validation(format!("'{value}' is not in YYYY-MM form"),),)?;
        let year = year
            .parse::<u16,>()
            .map_err(|e| Error::validation(format!("invalid year in '{value}': {e}"),),)?;
        let month = month
            .parse::<u8,>()
            .map_err(|e| Error::validation(format!("invalid month in '{value}': {e}"),),)?;
        Self::new(year, month,)
    }
}

impl fmt::Display for YearMonth
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        serializer.collect_str(self,)
    }
}

impl<'de,> Deserialize<'de,> for YearMonth
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        let raw = String::deserialize(deserializer,)?;
        raw.parse().map_err(serde::de::Error::custom,)
    }
}

/// Technology with a proficiency level in `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Skill
{
    /// Technology name.
    pub title: String,
    /// Proficiency, at most [`MAX_SKILL_LEVEL`].
    pub level: u8,
    /// Icon identifier.
    #[serde(default)]
    pub icon:  Option<String,>,
    /// Accent color, usually a hex code.
    #[serde(default)]
    pub color: Option<String,>,
}

/// Completed or ongoing course of study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Education
{
    /// Degree or certificate name.
    pub degree:   String,
    /// Institution.
    pub school:   String,
    /// Free-form span, such as `2018 - 2022`.
    pub duration: String,
}

/// Spoken language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Language
{
    /// Language name.
    pub name:        String,
    /// Proficiency in words, such as `Fluent`.
    pub description: String,
}
