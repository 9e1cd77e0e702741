//! Paging and whitelisted sorting for list queries.

use crate::domain::{Speaker, TalkView};
use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A sortable property: its API name and the column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub property: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

/// Properties a listing accepts, plus its fallback order.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub allowed: &'static [SortField],
    pub default: SortKey,
}

impl SortSpec {
    /// Parses `prop[,asc|desc]` keys joined by `;`. Unknown properties and
    /// directions are dropped; if nothing is left the default order applies.
    pub fn parse(&self, raw: Option<&str>) -> Vec<SortKey> {
        let keys: Vec<SortKey> = raw
            .unwrap_or_default()
            .split(';')
            .filter_map(|part| {
                let mut pieces = part.split(',').map(str::trim);
                let property = pieces.next().filter(|p| !p.is_empty())?;
                let field = *self
                    .allowed
                    .iter()
                    .find(|f| f.property.eq_ignore_ascii_case(property))?;
                let direction = match pieces.next() {
                    None | Some("") => Direction::Asc,
                    Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
                    Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
                    Some(_) => return None,
                };
                Some(SortKey { field, direction })
            })
            .collect();

        if keys.is_empty() {
            vec![self.default]
        } else {
            keys
        }
    }
}

const SPEAKER_FIELDS: &[SortField] = &[
    SortField { property: "id", column: "id" },
    SortField { property: "name", column: "name" },
];

pub const SPEAKER_SORT: SortSpec = SortSpec {
    allowed: SPEAKER_FIELDS,
    default: SortKey {
        field: SortField { property: "name", column: "name" },
        direction: Direction::Asc,
    },
};

const TALK_FIELDS: &[SortField] = &[
    SortField { property: "id", column: "t.id" },
    SortField { property: "title", column: "t.title" },
    SortField { property: "date", column: "t.date" },
    SortField { property: "views", column: "t.views" },
    SortField { property: "likes", column: "t.likes" },
    SortField { property: "link", column: "t.link" },
    SortField { property: "speakerId", column: "t.speaker_id" },
];

pub const TALK_SORT: SortSpec = SortSpec {
    allowed: TALK_FIELDS,
    default: SortKey {
        field: SortField { property: "title", column: "t.title" },
        direction: Direction::Asc,
    },
};

/// `ORDER BY` clause built only from whitelisted columns.
pub fn order_by_clause(keys: &[SortKey]) -> String {
    let parts: Vec<String> = keys
        .iter()
        .map(|k| format!("{} {}", k.field.column, k.direction.as_sql()))
        .collect();
    format!("ORDER BY {}", parts.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index.
    pub page: u32,
    pub size: u32,
    pub sort: Vec<SortKey>,
}

impl PageRequest {
    pub fn new(page: Option<u32>, size: Option<u32>, sort: Vec<SortKey>) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[aliases(SpeakerPage = Page<Speaker>, TalkPage = Page<TalkView>)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.size);
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: (total_elements + size - 1) / size,
        }
    }
}
