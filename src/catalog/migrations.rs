pub const MIGRATIONS: &[&str] = &["
    CREATE TABLE IF NOT EXISTS applications (
        id INTEGER PRIMARY KEY,
        wallpaper_path TEXT NOT NULL,
        name TEXT NOT NULL,
        applied_at INTEGER NOT NULL,
        report_json TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS applications_applied_at ON applications (applied_at);
"];
