//! Query composition for listing endpoints.
//!
//! Builds the WHERE fragment, bind list and ORDER BY clause consumed by the
//! repository layer from raw listing parameters: recognized sort keys fall
//! back to a per-entity default, search terms match case-insensitively
//! against a fixed per-entity column set, and an optional priority id ranks
//! one record ahead of the chosen ordering (used to surface a just-created
//! record on page one). Pure and stateless; state filter strings are the only
//! input that can be rejected.

use crate::error::{AppError, AppResult};
use crate::models::asset::AssetQuery;
use crate::models::assignment::AssignmentQuery;
use crate::models::enums::{AssetStatus, AssignmentStatus, ReturnRequestStatus};
use crate::models::return_request::ReturnRequestQuery;
use crate::models::user::UserQuery;

/// Fixed page size for every listing
pub const PAGE_SIZE: i64 = 10;

/// One page of results plus the total over the filtered set
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Only the literal "desc" (any case) selects descending order
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(p) if p.trim().eq_ignore_ascii_case("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSortKey {
    Code,
    Name,
    Category,
    InstalledDate,
    State,
}

impl AssetSortKey {
    /// Unknown keys silently select the default (code)
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(normalize_key).as_deref() {
            Some("assetname") | Some("name") => AssetSortKey::Name,
            Some("category") => AssetSortKey::Category,
            Some("installeddate") => AssetSortKey::InstalledDate,
            Some("state") => AssetSortKey::State,
            _ => AssetSortKey::Code,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            AssetSortKey::Code => "a.code",
            AssetSortKey::Name => "a.name",
            AssetSortKey::Category => "c.name",
            AssetSortKey::InstalledDate => "a.installed_date",
            AssetSortKey::State => "a.state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSortKey {
    AssetCode,
    AssetName,
    AssignedTo,
    AssignedBy,
    AssignedDate,
    State,
}

impl AssignmentSortKey {
    /// Unknown keys silently select the default (assigned date)
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(normalize_key).as_deref() {
            Some("assetcode") => AssignmentSortKey::AssetCode,
            Some("assetname") => AssignmentSortKey::AssetName,
            Some("assignedto") => AssignmentSortKey::AssignedTo,
            Some("assignedby") => AssignmentSortKey::AssignedBy,
            Some("state") => AssignmentSortKey::State,
            _ => AssignmentSortKey::AssignedDate,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            AssignmentSortKey::AssetCode => "a.code",
            AssignmentSortKey::AssetName => "a.name",
            AssignmentSortKey::AssignedTo => "u.username",
            AssignmentSortKey::AssignedBy => "ub.username",
            AssignmentSortKey::AssignedDate => "asg.assigned_date",
            AssignmentSortKey::State => "asg.state",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    StaffCode,
    FullName,
    Username,
    JoinedDate,
    Role,
}

impl UserSortKey {
    /// Unknown keys silently select the default (staff code)
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(normalize_key).as_deref() {
            Some("fullname") | Some("name") => UserSortKey::FullName,
            Some("username") => UserSortKey::Username,
            Some("joineddate") => UserSortKey::JoinedDate,
            Some("role") | Some("type") => UserSortKey::Role,
            _ => UserSortKey::StaffCode,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            UserSortKey::StaffCode => "u.staff_code",
            UserSortKey::FullName => "u.first_name",
            UserSortKey::Username => "u.username",
            UserSortKey::JoinedDate => "u.joined_date",
            UserSortKey::Role => "r.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRequestSortKey {
    AssetCode,
    AssetName,
    RequestedBy,
    AcceptedBy,
    AssignedDate,
    ReturnedDate,
    State,
}

impl ReturnRequestSortKey {
    /// Unknown keys silently select the default (return date)
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(normalize_key).as_deref() {
            Some("assetcode") => ReturnRequestSortKey::AssetCode,
            Some("assetname") => ReturnRequestSortKey::AssetName,
            Some("requestedby") => ReturnRequestSortKey::RequestedBy,
            Some("acceptedby") => ReturnRequestSortKey::AcceptedBy,
            Some("assigneddate") => ReturnRequestSortKey::AssignedDate,
            Some("state") => ReturnRequestSortKey::State,
            _ => ReturnRequestSortKey::ReturnedDate,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ReturnRequestSortKey::AssetCode => "a.code",
            ReturnRequestSortKey::AssetName => "a.name",
            ReturnRequestSortKey::RequestedBy => "u.username",
            ReturnRequestSortKey::AcceptedBy => "acc.username",
            ReturnRequestSortKey::AssignedDate => "asg.assigned_date",
            ReturnRequestSortKey::ReturnedDate => "rr.return_date",
            ReturnRequestSortKey::State => "rr.state",
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Composed filter, ordering and paging for one listing query
#[derive(Debug, Clone)]
pub struct Selection {
    clauses: Vec<String>,
    binds: Vec<String>,
    order: String,
    limit: i64,
    offset: i64,
}

impl Selection {
    /// `WHERE ...` fragment, empty string when nothing filters
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Full `ORDER BY ...` fragment
    pub fn order_sql(&self) -> &str {
        &self.order
    }

    /// Positional string binds, in `$1..` order
    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

fn page_offset(page: Option<i64>) -> i64 {
    (page.unwrap_or(1).max(1) - 1) * PAGE_SIZE
}

/// Case-insensitive substring match over `columns`, OR-combined, one bind
fn search_clause(binds: &mut Vec<String>, term: &str, columns: &[&str]) -> String {
    binds.push(format!("%{}%", term.to_lowercase()));
    let n = binds.len();
    let parts: Vec<String> = columns
        .iter()
        .map(|col| format!("LOWER({}) LIKE ${}", col, n))
        .collect();
    format!("({})", parts.join(" OR "))
}

/// Ordering with a stable id tie-break; a priority id ranks first regardless
fn order_clause(column: &str, dir: SortDirection, id_column: &str, priority_id: Option<i32>) -> String {
    let mut order = format!("{} {}, {} ASC", column, dir.sql(), id_column);
    if let Some(id) = priority_id {
        order = format!("CASE WHEN {} = {} THEN 0 ELSE 1 END, {}", id_column, id, order);
    }
    format!("ORDER BY {}", order)
}

fn trimmed(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Per-entity composition
// ---------------------------------------------------------------------------

/// Compose the asset listing. Default view shows NotAvailable, Available and
/// Assigned; recycling states only on an explicit filter.
pub fn compose_assets(q: &AssetQuery) -> AppResult<Selection> {
    let mut clauses = vec!["a.is_deleted = FALSE".to_string()];
    let mut binds = Vec::new();

    match trimmed(q.state.as_deref()) {
        None => clauses.push(format!(
            "a.state IN ({}, {}, {})",
            i16::from(AssetStatus::NotAvailable),
            i16::from(AssetStatus::Available),
            i16::from(AssetStatus::Assigned),
        )),
        Some(s) if s.eq_ignore_ascii_case("all") => {}
        Some(s) => {
            let state: AssetStatus = s.parse().map_err(AppError::InvalidFilterValue)?;
            clauses.push(format!("a.state = {}", i16::from(state)));
        }
    }

    if let Some(category_id) = q.category_id {
        clauses.push(format!("a.category_id = {}", category_id));
    }
    if let Some(location_id) = q.location_id {
        clauses.push(format!("a.location_id = {}", location_id));
    }
    if let Some(term) = trimmed(q.search.as_deref()) {
        clauses.push(search_clause(&mut binds, term, &["a.code", "a.name"]));
    }

    let key = AssetSortKey::from_param(q.sort.as_deref());
    let dir = SortDirection::from_param(q.order.as_deref());

    Ok(Selection {
        clauses,
        binds,
        order: order_clause(key.column(), dir, "a.id", q.priority_id),
        limit: PAGE_SIZE,
        offset: page_offset(q.page),
    })
}

/// Compose the assignment listing. The default view is the union of
/// WaitingForAcceptance and Accepted, not all history.
pub fn compose_assignments(q: &AssignmentQuery) -> AppResult<Selection> {
    let mut clauses = vec!["asg.is_deleted = FALSE".to_string()];
    let mut binds = Vec::new();

    match trimmed(q.state.as_deref()) {
        None => clauses.push(default_assignment_states()),
        Some(s) if s.eq_ignore_ascii_case("all") => clauses.push(default_assignment_states()),
        Some(s) => {
            let state: AssignmentStatus = s.parse().map_err(AppError::InvalidFilterValue)?;
            clauses.push(format!("asg.state = {}", i16::from(state)));
        }
    }

    if let Some(date) = q.assigned_date {
        clauses.push(format!("asg.assigned_date = '{}'", date));
    }
    if let Some(term) = trimmed(q.search.as_deref()) {
        clauses.push(search_clause(&mut binds, term, &["a.code", "a.name", "u.username"]));
    }

    let key = AssignmentSortKey::from_param(q.sort.as_deref());
    let dir = SortDirection::from_param(q.order.as_deref());

    Ok(Selection {
        clauses,
        binds,
        order: order_clause(key.column(), dir, "asg.id", q.priority_id),
        limit: PAGE_SIZE,
        offset: page_offset(q.page),
    })
}

fn default_assignment_states() -> String {
    format!(
        "asg.state IN ({}, {})",
        i16::from(AssignmentStatus::WaitingForAcceptance),
        i16::from(AssignmentStatus::Accepted),
    )
}

/// Compose the user listing
pub fn compose_users(q: &UserQuery) -> AppResult<Selection> {
    let mut clauses = vec!["u.is_deleted = FALSE".to_string()];
    let mut binds = Vec::new();

    if let Some(role_id) = q.role_id {
        clauses.push(format!("u.role_id = {}", role_id));
    }
    if let Some(location_id) = q.location_id {
        clauses.push(format!("u.location_id = {}", location_id));
    }
    if let Some(term) = trimmed(q.search.as_deref()) {
        clauses.push(search_clause(
            &mut binds,
            term,
            &["u.staff_code", "u.first_name || ' ' || u.last_name", "u.username"],
        ));
    }

    let key = UserSortKey::from_param(q.sort.as_deref());
    let dir = SortDirection::from_param(q.order.as_deref());

    Ok(Selection {
        clauses,
        binds,
        order: order_clause(key.column(), dir, "u.id", q.priority_id),
        limit: PAGE_SIZE,
        offset: page_offset(q.page),
    })
}

/// Compose the return request listing. Every state is shown by default.
pub fn compose_return_requests(q: &ReturnRequestQuery) -> AppResult<Selection> {
    let mut clauses = vec!["rr.is_deleted = FALSE".to_string()];
    let mut binds = Vec::new();

    match trimmed(q.state.as_deref()) {
        None => {}
        Some(s) if s.eq_ignore_ascii_case("all") => {}
        Some(s) => {
            let state: ReturnRequestStatus = s.parse().map_err(AppError::InvalidFilterValue)?;
            clauses.push(format!("rr.state = {}", i16::from(state)));
        }
    }

    if let Some(date) = q.return_date {
        clauses.push(format!("rr.return_date = '{}'", date));
    }
    if let Some(term) = trimmed(q.search.as_deref()) {
        clauses.push(search_clause(&mut binds, term, &["a.code", "a.name", "u.username"]));
    }

    let key = ReturnRequestSortKey::from_param(q.sort.as_deref());
    let dir = SortDirection::from_param(q.order.as_deref());

    Ok(Selection {
        clauses,
        binds,
        order: order_clause(key.column(), dir, "rr.id", q.priority_id),
        limit: PAGE_SIZE,
        offset: page_offset(q.page),
    })
}
