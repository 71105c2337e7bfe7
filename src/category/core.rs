//! Defines the category catalog: built-in categories shared by every user
//! and user-defined categories stored in the database.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    database_id::{DatabaseId, UserId},
};

/// Whether a category groups money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl CategoryKind {
    /// The lowercase wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for CategoryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid category kind {other:?}").into(),
            )),
        }
    }
}

/// The well-known ids of the built-in categories.
///
/// Built-ins are process-wide constants: never persisted, never deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCategoryId {
    Salary,
    Scholarship,
    Pension,
    OtherIncome,
    Transport,
    Groceries,
    Shopping,
    Entertainment,
    OtherExpense,
}

impl BuiltinCategoryId {
    /// The stable wire id, e.g. `"default_salary"`.
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinCategoryId::Salary => "default_salary",
            BuiltinCategoryId::Scholarship => "default_scholarship",
            BuiltinCategoryId::Pension => "default_pension",
            BuiltinCategoryId::OtherIncome => "default_other_income",
            BuiltinCategoryId::Transport => "default_transport",
            BuiltinCategoryId::Groceries => "default_products",
            BuiltinCategoryId::Shopping => "default_shopping",
            BuiltinCategoryId::Entertainment => "default_entertainment",
            BuiltinCategoryId::OtherExpense => "default_other_expense",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        BUILTIN_CATEGORIES
            .iter()
            .map(|category| category.id)
            .find(|id| id.as_str() == s)
    }
}

/// A built-in category definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuiltinCategory {
    /// The well-known id.
    pub id: BuiltinCategoryId,
    /// The display name.
    pub name: &'static str,
    /// The emoji icon.
    pub icon: &'static str,
    /// The display color as a hex string.
    pub color: &'static str,
    /// Income or expense.
    pub kind: CategoryKind,
}

/// The categories available to every user out of the box.
pub static BUILTIN_CATEGORIES: [BuiltinCategory; 9] = [
    BuiltinCategory {
        id: BuiltinCategoryId::Salary,
        name: "Salary",
        icon: "💼",
        color: "#4CAF50",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Scholarship,
        name: "Scholarship",
        icon: "🎓",
        color: "#8BC34A",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Pension,
        name: "Pension",
        icon: "👵",
        color: "#CDDC39",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::OtherIncome,
        name: "Other",
        icon: "💰",
        color: "#FFC107",
        kind: CategoryKind::Income,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Transport,
        name: "Transport",
        icon: "🚕",
        color: "#F44336",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Groceries,
        name: "Groceries",
        icon: "🍎",
        color: "#E91E63",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Shopping,
        name: "Shopping",
        icon: "🛍️",
        color: "#9C27B0",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::Entertainment,
        name: "Entertainment",
        icon: "🎬",
        color: "#673AB7",
        kind: CategoryKind::Expense,
    },
    BuiltinCategory {
        id: BuiltinCategoryId::OtherExpense,
        name: "Other",
        icon: "💸",
        color: "#3F51B5",
        kind: CategoryKind::Expense,
    },
];

/// A category reference: either a well-known built-in id or the row id of a
/// user-defined category.
///
/// Keeping the two cases as a tagged type means category resolution is
/// exhaustive instead of relying on a string-prefix convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryId {
    /// One of [BUILTIN_CATEGORIES].
    Builtin(BuiltinCategoryId),
    /// A user-defined category row.
    User(DatabaseId),
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryId::Builtin(id) => write!(f, "{}", id.as_str()),
            CategoryId::User(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for CategoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(builtin) = BuiltinCategoryId::from_wire(s) {
            return Ok(CategoryId::Builtin(builtin));
        }

        s.parse::<DatabaseId>()
            .map(CategoryId::User)
            .map_err(|_| Error::MalformedCategoryId(s.to_owned()))
    }
}

impl Serialize for CategoryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ToSql for CategoryId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for CategoryId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// The name of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The icon of a category: exactly one glyph (a single grapheme cluster,
/// so emoji built from multiple code points count as one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryIcon(String);

impl CategoryIcon {
    /// Create a category icon.
    ///
    /// # Errors
    ///
    /// This function will return an error if `icon` is not exactly one
    /// grapheme cluster.
    pub fn new(icon: &str) -> Result<Self, Error> {
        if icon.graphemes(true).count() == 1 {
            Ok(Self(icon.to_string()))
        } else {
            Err(Error::InvalidCategoryIcon(icon.to_string()))
        }
    }

    /// Create a category icon without validation.
    pub fn new_unchecked(icon: &str) -> Self {
        Self(icon.to_string())
    }
}

impl AsRef<str> for CategoryIcon {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A category created by a user, e.g. 'Pets', 'Freelance'.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserCategory {
    /// The row id of the category.
    pub id: DatabaseId,
    /// The user who owns the category.
    pub user_id: UserId,
    /// The display name.
    pub name: CategoryName,
    /// The emoji icon.
    pub icon: CategoryIcon,
    /// The display color as a hex string.
    pub color: String,
    /// Income or expense.
    pub kind: CategoryKind,
}

/// A category a transaction can reference: built-in or user-defined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// One of [BUILTIN_CATEGORIES].
    Builtin(&'static BuiltinCategory),
    /// A category created by a user.
    User(UserCategory),
}

impl Category {
    /// The id used to reference this category from transactions.
    pub fn id(&self) -> CategoryId {
        match self {
            Category::Builtin(builtin) => CategoryId::Builtin(builtin.id),
            Category::User(user) => CategoryId::User(user.id),
        }
    }

    /// The display name.
    pub fn name(&self) -> &str {
        match self {
            Category::Builtin(builtin) => builtin.name,
            Category::User(user) => user.name.as_ref(),
        }
    }

    /// The emoji icon.
    pub fn icon(&self) -> &str {
        match self {
            Category::Builtin(builtin) => builtin.icon,
            Category::User(user) => user.icon.as_ref(),
        }
    }

    /// The display color.
    pub fn color(&self) -> &str {
        match self {
            Category::Builtin(builtin) => builtin.color,
            Category::User(user) => &user.color,
        }
    }

    /// Income or expense.
    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::Builtin(builtin) => builtin.kind,
            Category::User(user) => user.kind,
        }
    }
}

/// The fields needed to create a user-defined category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// The display name.
    pub name: CategoryName,
    /// The emoji icon.
    pub icon: CategoryIcon,
    /// The display color as a hex string.
    pub color: String,
    /// Income or expense.
    pub kind: CategoryKind,
}

/// Create a user-defined category in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_category(
    user_id: UserId,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<UserCategory, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, icon, color, kind) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            user_id,
            new_category.name.as_ref(),
            new_category.icon.as_ref(),
            &new_category.color,
            new_category.kind,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(UserCategory {
        id,
        user_id,
        name: new_category.name,
        icon: new_category.icon,
        color: new_category.color,
        kind: new_category.kind,
    })
}

/// Resolve a category reference for `user_id`.
///
/// # Errors
/// This function will return an [Error::InvalidCategory] if the id is not a
/// built-in and does not match a category owned by `user_id`, or an
/// [Error::SqlError] if there is some other SQL error.
pub fn resolve_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    match category_id {
        CategoryId::Builtin(builtin_id) => {
            let builtin = BUILTIN_CATEGORIES
                .iter()
                .find(|category| category.id == builtin_id)
                .expect("every BuiltinCategoryId has an entry in BUILTIN_CATEGORIES");

            Ok(Category::Builtin(builtin))
        }
        CategoryId::User(row_id) => connection
            .prepare(
                "SELECT id, user_id, name, icon, color, kind FROM category
                 WHERE id = :id AND user_id = :user_id;",
            )?
            .query_row(
                &[(":id", &row_id), (":user_id", &user_id)],
                map_category_row,
            )
            .map(Category::User)
            .map_err(|error| match Error::from(error) {
                Error::NotFound => Error::InvalidCategory(category_id),
                other => other,
            }),
    }
}

/// Retrieve the full category catalog for `user_id`: the built-in
/// categories in declaration order, followed by the user's own categories.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn all_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    let mut categories: Vec<Category> = BUILTIN_CATEGORIES.iter().map(Category::Builtin).collect();

    let user_categories = connection
        .prepare(
            "SELECT id, user_id, name, icon, color, kind FROM category
             WHERE user_id = :user_id ORDER BY id ASC;",
        )?
        .query_map(&[(":user_id", &user_id)], map_category_row)?
        .collect::<Result<Vec<_>, _>>()?;

    categories.extend(user_categories.into_iter().map(Category::User));

    Ok(categories)
}

/// Delete a user-defined category.
///
/// The category's transactions are never cascade-deleted: a category that
/// is still referenced stays, and the caller gets a conflict error.
///
/// # Errors
/// This function will return a:
/// - [Error::BuiltinCategoryReadOnly] if `category_id` is a built-in,
/// - [Error::CategoryInUse] if any transaction still references the
///   category (nothing is deleted in that case),
/// - [Error::DeleteMissingCategory] if the category does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let row_id = match category_id {
        CategoryId::Builtin(_) => return Err(Error::BuiltinCategoryReadOnly),
        CategoryId::User(row_id) => row_id,
    };

    let owner_id: UserId = connection
        .query_row(
            "SELECT user_id FROM category WHERE id = ?1;",
            [row_id],
            |row| row.get(0),
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::DeleteMissingCategory,
            other => other,
        })?;

    let reference_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1 AND category_id = ?2;",
        (owner_id, category_id),
        |row| row.get(0),
    )?;

    if reference_count > 0 {
        return Err(Error::CategoryInUse(category_id));
    }

    connection.execute("DELETE FROM category WHERE id = ?1;", [row_id])?;

    Ok(())
}

/// Create the category table in the database.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            kind TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<UserCategory, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let raw_icon: String = row.get(3)?;
    let color = row.get(4)?;
    let kind = row.get(5)?;

    Ok(UserCategory {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        icon: CategoryIcon::new_unchecked(&raw_icon),
        color,
        kind,
    })
}




#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use super::{
        BuiltinCategoryId, Category, CategoryIcon, CategoryId, CategoryKind, CategoryName,
        NewCategory, all_categories, create_category, delete_category, resolve_category,
    };
    use crate::{Error, database_id::UserId, db::initialize};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    // The category table has a foreign key on the user table, so every test
    // needs a real user row.
    fn make_user(email: &str, connection: &Connection) -> UserId {
        connection
            .query_row(
                "INSERT INTO user (email, password, name, currency, created_at)
                 VALUES (?1, 'not-a-real-hash', 'Test User', 'RUB', ?2)
                 RETURNING id",
                (email, OffsetDateTime::now_utc()),
                |row| row.get(0),
            )
            .expect("Could not insert user")
    }

    fn pets_category() -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked("Pets"),
            icon: CategoryIcon::new_unchecked("🐈"),
            color: "#FF9800".to_owned(),
            kind: CategoryKind::Expense,
        }
    }

    #[test]
    fn create_category_assigns_id() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);

        let category = create_category(user, pets_category(), &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, CategoryName::new_unchecked("Pets"));
        assert_eq!(category.kind, CategoryKind::Expense);
    }

    #[test]
    fn all_categories_lists_builtins_then_user_categories() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);
        let created = create_category(user, pets_category(), &connection)
            .expect("Could not create category");

        let categories = all_categories(user, &connection).expect("Could not list categories");

        assert_eq!(categories.len(), super::BUILTIN_CATEGORIES.len() + 1);
        assert!(matches!(categories[0], Category::Builtin(_)));
        assert_eq!(
            categories.last().unwrap(),
            &Category::User(created.clone())
        );
    }

    #[test]
    fn all_categories_excludes_other_users_categories() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);
        let other_user = make_user("other@example.com", &connection);
        create_category(other_user, pets_category(), &connection)
            .expect("Could not create category");

        let categories = all_categories(user, &connection).expect("Could not list categories");

        assert_eq!(categories.len(), super::BUILTIN_CATEGORIES.len());
    }

    #[test]
    fn categories_deduplicate_in_a_hash_set() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);
        create_category(user, pets_category(), &connection).expect("Could not create category");

        let categories = all_categories(user, &connection).expect("Could not list categories");
        let unique: std::collections::HashSet<Category> =
            categories.iter().cloned().chain(categories.clone()).collect();

        assert_eq!(unique.len(), categories.len());
    }

    #[test]
    fn resolve_builtin_category() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);

        let category = resolve_category(
            CategoryId::Builtin(BuiltinCategoryId::Groceries),
            user,
            &connection,
        )
        .expect("Could not resolve built-in category");

        assert_eq!(category.name(), "Groceries");
        assert_eq!(category.kind(), CategoryKind::Expense);
    }

    #[test]
    fn resolve_rejects_foreign_user_category() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);
        let other_user = make_user("other@example.com", &connection);
        let created = create_category(other_user, pets_category(), &connection)
            .expect("Could not create category");
        let id = CategoryId::User(created.id);

        let result = resolve_category(id, user, &connection);

        assert_eq!(result, Err(Error::InvalidCategory(id)));
    }

    #[test]
    fn delete_unreferenced_category_succeeds() {
        let connection = get_test_connection();
        let user = make_user("cat@example.com", &connection);
        let created = create_category(user, pets_category(), &connection)
            .expect("Could not create category");

        let result = delete_category(CategoryId::User(created.id), &connection);

        assert_eq!(result, Ok(()));
        let categories = all_categories(user, &connection).expect("Could not list categories");
        assert_eq!(categories.len(), super::BUILTIN_CATEGORIES.len());
    }

    #[test]
    fn delete_missing_category_fails() {
        let connection = get_test_connection();

        let result = delete_category(CategoryId::User(999), &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn delete_builtin_category_is_rejected() {
        let connection = get_test_connection();

        let result = delete_category(CategoryId::Builtin(BuiltinCategoryId::Salary), &connection);

        assert_eq!(result, Err(Error::BuiltinCategoryReadOnly));
    }
}
