use crate::config::{SelectionMode, TableConfig};

// Backtick-quote an identifier, allowing `schema.table`.
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("`{}`", part.replace('`', "``")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Read query returning `(id, url, subdir)`; the filter value is bound as the only parameter.
pub fn select_records(t: &TableConfig, mode: SelectionMode) -> String {
    let id = quote_ident(&t.id_column);
    let url = quote_ident(&t.url_column);
    let file_name = quote_ident(&t.file_name_column);
    let mut sql = format!(
        "SELECT CAST({id} AS SIGNED) AS id, CAST({url} AS CHAR) AS url, CAST({file_name} AS CHAR) AS subdir \
         FROM {table} WHERE {filter} = ? AND {url} IS NOT NULL",
        table = quote_ident(&t.table),
        filter = quote_ident(&t.where_column),
    );
    if mode == SelectionMode::ByNullFilename {
        sql.push_str(&format!(" AND {file_name} IS NULL"));
    }
    sql.push_str(&format!(" ORDER BY {id}"));
    sql
}

/// Three-column update keyed by id; binds url, file name, raw url, id in that order.
pub fn update_migrated(t: &TableConfig) -> String {
    format!(
        "UPDATE {} SET {} = ?, {} = ?, {} = ? WHERE {} = ?",
        quote_ident(&t.table),
        quote_ident(&t.url_column),
        quote_ident(&t.file_name_column),
        quote_ident(&t.raw_url_column),
        quote_ident(&t.id_column),
    )
}
