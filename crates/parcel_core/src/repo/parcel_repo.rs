//! Parcel store contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `Parcel` records to rows of the single `parcel` table.
//! - Gate address edits and deletes on `registered` status.
//!
//! # Invariants
//! - `add` calls `Parcel::validate()` before inserting.
//! - Read paths reject invalid persisted state instead of masking it.
//! - One SQL statement per operation; no retries, no logging.

use crate::db::DbError;
use crate::model::parcel::{
    is_utc_rfc3339, ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError,
    PARCEL_STATUS_REGISTERED,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: &[&str] = &["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for parcel persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ParcelValidationError),
    Db(DbError),
    /// No row with this parcel number.
    NotFound(ParcelNumber),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl StoreError {
    /// Returns whether this is the not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParcelValidationError> for StoreError {
    fn from(value: ParcelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable CRUD access to parcels plus client-scoped lookup.
pub trait ParcelStore {
    /// Inserts a parcel and returns the storage-assigned number.
    /// The caller's `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> StoreResult<ParcelNumber>;
    /// Loads one parcel; `StoreError::NotFound` when absent.
    fn get(&self, number: ParcelNumber) -> StoreResult<Parcel>;
    /// Lists every parcel of one client. Order is not part of the contract.
    fn get_by_client(&self, client: ClientId) -> StoreResult<Vec<Parcel>>;
    /// Overwrites the address of a `registered` parcel; no-op otherwise.
    fn set_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()>;
    /// Overwrites the status unconditionally.
    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> StoreResult<()>;
    /// Deletes a `registered` parcel; no-op otherwise or when absent.
    fn delete(&self, number: ParcelNumber) -> StoreResult<()>;
}

impl<S: ParcelStore + ?Sized> ParcelStore for &S {
    fn add(&self, parcel: &Parcel) -> StoreResult<ParcelNumber> {
        (**self).add(parcel)
    }

    fn get(&self, number: ParcelNumber) -> StoreResult<Parcel> {
        (**self).get(number)
    }

    fn get_by_client(&self, client: ClientId) -> StoreResult<Vec<Parcel>> {
        (**self).get_by_client(client)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()> {
        (**self).set_address(number, address)
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> StoreResult<()> {
        (**self).set_status(number, status)
    }

    fn delete(&self, number: ParcelNumber) -> StoreResult<()> {
        (**self).delete(number)
    }
}

/// SQLite-backed parcel store over an externally owned connection.
pub struct SqliteParcelStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelStore<'conn> {
    /// Wraps a connection without inspecting its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying the `parcel` table layout.
    ///
    /// Never creates or migrates schema.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_parcel_schema(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelStore for SqliteParcelStore<'_> {
    fn add(&self, parcel: &Parcel) -> StoreResult<ParcelNumber> {
        parcel.validate()?;

        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, number: ParcelNumber) -> StoreResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let raw = stmt.query_row([number], read_raw_row).optional()?;
        match raw {
            Some(raw) => parse_parcel_row(raw),
            None => Err(StoreError::NotFound(number)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> StoreResult<Vec<Parcel>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "{PARCEL_SELECT_SQL} WHERE client = ?1 ORDER BY number ASC;"
        ))?;

        let mut rows = stmt.query([client])?;
        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(read_raw_row(row)?)?);
        }

        Ok(parcels)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3;",
            params![address, number, PARCEL_STATUS_REGISTERED],
        )?;
        Ok(())
    }

    fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status.as_str(), number],
        )?;
        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> StoreResult<()> {
        self.conn.execute(
            "DELETE FROM parcel WHERE number = ?1 AND status = ?2;",
            params![number, PARCEL_STATUS_REGISTERED],
        )?;
        Ok(())
    }
}

/// Column values as stored, before domain parsing.
struct RawParcelRow {
    number: ParcelNumber,
    client: ClientId,
    status: String,
    address: String,
    created_at: String,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawParcelRow> {
    Ok(RawParcelRow {
        number: row.get("number")?,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_parcel_row(raw: RawParcelRow) -> StoreResult<Parcel> {
    let status = ParcelStatus::parse(&raw.status).map_err(|err| {
        StoreError::InvalidData(format!(
            "parcel {}: {err} in parcel.status",
            raw.number
        ))
    })?;

    if !is_utc_rfc3339(&raw.created_at) {
        return Err(StoreError::InvalidData(format!(
            "parcel {}: invalid created_at `{}` in parcel.created_at",
            raw.number, raw.created_at
        )));
    }

    Ok(Parcel {
        number: raw.number,
        client: raw.client,
        status,
        address: raw.address,
        created_at: raw.created_at,
    })
}

fn ensure_parcel_schema(conn: &Connection) -> StoreResult<()> {
    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [PARCEL_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(StoreError::MissingRequiredTable(PARCEL_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({PARCEL_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for &column in PARCEL_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(StoreError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}
