// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Enriched project records produced by the refresh pipeline.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::registry::ProjectDescriptor;

/// Marker emitted for counts that could not be resolved.
pub const UNKNOWN_MARKER: &str = "?";

/// Star or fork count that may be unknown.
///
/// The derived ordering places [`Count::Unknown`] below every known value,
/// including zero, so unresolved repositories rank last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,)]
pub enum Count
{
    /// The source repository could not be resolved.
    #[default]
    Unknown,
    /// Value reported by the API.
    Known(u64,),
}

impl Count
{
    /// Returns the known value, if any.
    pub fn value(self,) -> Option<u64,>
    {
        match self {
            Self::Known(value,) => Some(value,),
            Self::Unknown => None,
        }
    }

    /// Returns `true` for [`Count::Unknown`].
    pub fn is_unknown(self,) -> bool
    {
        matches!(self, Self::Unknown)
    }
}

impl From<u64,> for Count
{
    fn from(value: u64,) -> Self
    {
        Self::Known(value,)
    }
}

impl fmt::Display for Count
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match self {
            Self::Known(value,) => write!(f, "{value}"),
            Self::Unknown => f.write_str(UNKNOWN_MARKER,),
        }
    }
}

impl Serialize for Count
{
    fn serialize<S,>(&self, serializer: S,) -> Result<S::Ok, S::Error,>
    where
        S: Serializer,
    {
        match self {
            Self::Known(value,) => serializer.serialize_u64(*value,),
            Self::Unknown => serializer.serialize_str(UNKNOWN_MARKER,),
        }
    }
}

impl<'de,> Deserialize<'de,> for Count
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        #[derive(Deserialize,)]
        #[serde(untagged)]
        enum RawCount
        {
            Number(u64,),
            Marker(String,),
        }

        match RawCount::deserialize(deserializer,)? {
            RawCount::Number(value,) => Ok(Self::Known(value,),),
            RawCount::Marker(marker,) if marker == UNKNOWN_MARKER => Ok(Self::Unknown,),
            RawCount::Marker(other,) => {
                Err(serde::de::Error::custom(format!("unexpected count marker '{other}'"),),)
            }
        }
    }
}

/// Contributor identity attached to an enriched project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct ContributorSummary
{
    /// Account login.
    pub login:         String,
    /// Avatar image URL.
    pub avatar_url:    String,
    /// Profile page URL.
    pub profile_url:   String,
    /// Number of contributions, `0` when the source does not report it.
    #[serde(default)]
    pub contributions: u32,
}

/// Project descriptor augmented with live popularity data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct EnrichedProject
{
    /// Static descriptor this record was derived from.
    #[serde(flatten)]
    pub descriptor:   ProjectDescriptor,
    /// Stargazer count.
    pub stars:        Count,
    /// Fork count.
    pub forks:        Count,
    /// Contributors in the order returned by the source.
    #[serde(default)]
    pub contributors: Vec<ContributorSummary,>,
}

impl EnrichedProject
{
    /// Wraps a descriptor whose repository could not be resolved.
    pub fn unresolved(descriptor: ProjectDescriptor,) -> Self
    {
        Self {
            descriptor,
            stars: Count::Unknown,
            forks: Count::Unknown,
            contributors: Vec::new(),
        }
    }
}
