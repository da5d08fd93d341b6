//! Command line front end for the employee store.
//!
//! # Responsibility
//! - Resolve configuration (file, environment, flags) and open the database.
//! - Map subcommands onto `EmployeeService` calls and print the results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use employee_core::db::{open_db, open_db_in_memory};
use employee_core::{
    init_logging, AppConfig, Employee, EmployeeId, EmployeeService, SqliteEmployeeRepository,
};
use log::info;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "employee", about = "Manage employee records", version)]
struct Cli {
    /// Config file; missing files fall back to defaults.
    #[arg(long, global = true, default_value = "employee.toml")]
    config: PathBuf,

    /// SQLite file, overriding config and EMPLOYEE_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an employee.
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
    },
    /// Show one employee by id.
    Get { id: EmployeeId },
    /// List all employees.
    List,
    /// Look up one employee by email.
    FindByEmail { email: String },
    /// Replace an employee's email.
    UpdateEmail { id: EmployeeId, email: String },
    /// Delete an employee by id.
    Delete { id: EmployeeId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;
    config.apply_env_overrides()?;
    if let Some(db) = cli.db.clone() {
        config.database.path = Some(db);
    }

    if let Some(dir) = config.logging.dir.as_deref() {
        init_logging(&config.logging.level, dir).context("failed to initialize logging")?;
    }

    let conn = match config.database.path.as_deref() {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn)?);

    let stdout = std::io::stdout();
    run(&cli, &service, &mut stdout.lock())
}

fn run(
    cli: &Cli,
    service: &EmployeeService<SqliteEmployeeRepository<'_>>,
    out: &mut impl Write,
) -> Result<()> {
    match &cli.command {
        Commands::Add {
            first_name,
            last_name,
            email,
        } => {
            let saved = service.register(first_name.as_str(), last_name.as_str(), email.as_str())?;
            print_one(out, cli.json, Some(&saved))
        }
        Commands::Get { id } => print_one(out, cli.json, service.get(*id)?.as_ref()),
        Commands::List => print_many(out, cli.json, &service.list()?),
        Commands::FindByEmail { email } => {
            print_one(out, cli.json, service.find_by_email(email)?.as_ref())
        }
        Commands::UpdateEmail { id, email } => {
            let updated = service.change_email(*id, email.as_str())?;
            print_one(out, cli.json, Some(&updated))
        }
        Commands::Delete { id } => {
            let existed = service.remove(*id)?;
            info!("event=cli_delete module=cli status=ok id={id} existed={existed}");
            if cli.json {
                writeln!(out, "{}", serde_json::json!({ "id": id, "deleted": existed }))?;
            } else if existed {
                writeln!(out, "deleted employee {id}")?;
            } else {
                writeln!(out, "no employee with id {id}")?;
            }
            Ok(())
        }
    }
}

fn print_one(out: &mut impl Write, json: bool, employee: Option<&Employee>) -> Result<()> {
    match (json, employee) {
        (true, employee) => writeln!(out, "{}", serde_json::to_string_pretty(&employee)?)?,
        (false, Some(employee)) => writeln!(out, "{}", format_row(employee))?,
        (false, None) => writeln!(out, "not found")?,
    }
    Ok(())
}

fn print_many(out: &mut impl Write, json: bool, employees: &[Employee]) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(employees)?)?;
        return Ok(());
    }
    for employee in employees {
        writeln!(out, "{}", format_row(employee))?;
    }
    Ok(())
}

fn format_row(employee: &Employee) -> String {
    format!(
        "{}\t{} {}\t{}",
        employee.id.unwrap_or_default(),
        employee.first_name,
        employee.last_name,
        employee.email
    )
}

#[cfg(test)]
mod tests {
    use super::{format_row, run, Cli, Commands};
    use clap::Parser;
    use employee_core::db::open_db_in_memory;
    use employee_core::{Employee, EmployeeService, SqliteEmployeeRepository};

    fn exec(service: &EmployeeService<SqliteEmployeeRepository<'_>>, args: &[&str]) -> String {
        let argv = std::iter::once("employee").chain(args.iter().copied());
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run(&cli, service, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn subcommands_run_full_lifecycle_in_text_mode() {
        let conn = open_db_in_memory().unwrap();
        let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn).unwrap());

        let added = exec(
            &service,
            &[
                "add",
                "--first-name",
                "Peeku",
                "--last-name",
                "Neeku",
                "--email",
                "peeku.neeku@gmole .com",
            ],
        );
        assert_eq!(added, "1\tPeeku Neeku\tpeeku.neeku@gmole .com\n");

        assert_eq!(
            exec(&service, &["get", "1"]),
            "1\tPeeku Neeku\tpeeku.neeku@gmole .com\n"
        );
        assert_eq!(exec(&service, &["get", "2"]), "not found\n");

        assert_eq!(
            exec(&service, &["update-email", "1", "peekunewemail@gmail.com"]),
            "1\tPeeku Neeku\tpeekunewemail@gmail.com\n"
        );
        assert_eq!(
            exec(&service, &["list"]),
            "1\tPeeku Neeku\tpeekunewemail@gmail.com\n"
        );

        assert_eq!(exec(&service, &["delete", "1"]), "deleted employee 1\n");
        assert_eq!(exec(&service, &["delete", "1"]), "no employee with id 1\n");
        assert_eq!(
            exec(&service, &["find-by-email", "peekunewemail@gmail.com"]),
            "not found\n"
        );
        assert_eq!(exec(&service, &["list"]), "");
    }

    #[test]
    fn subcommands_emit_json_when_requested() {
        let conn = open_db_in_memory().unwrap();
        let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn).unwrap());

        exec(
            &service,
            &[
                "add",
                "--first-name",
                "Grace",
                "--last-name",
                "Hopper",
                "--email",
                "grace@example.com",
            ],
        );

        let listed: serde_json::Value =
            serde_json::from_str(&exec(&service, &["--json", "list"])).unwrap();
        assert_eq!(
            listed,
            serde_json::json!([{
                "id": 1,
                "first_name": "Grace",
                "last_name": "Hopper",
                "email": "grace@example.com"
            }])
        );

        let output = exec(&service, &["--json", "find-by-email", "grace@example.com"]);
        let found: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(found["id"], 1);

        assert_eq!(exec(&service, &["--json", "get", "9"]).trim(), "null");

        let deleted: serde_json::Value =
            serde_json::from_str(&exec(&service, &["--json", "delete", "1"])).unwrap();
        assert_eq!(deleted, serde_json::json!({ "id": 1, "deleted": true }));
    }

    #[test]
    fn update_email_for_missing_id_fails() {
        let conn = open_db_in_memory().unwrap();
        let service = EmployeeService::new(SqliteEmployeeRepository::try_new(&conn).unwrap());
        let cli = Cli::try_parse_from(["employee", "update-email", "4", "x@example.com"]).unwrap();

        let err = run(&cli, &service, &mut Vec::<u8>::new()).unwrap_err();
        assert!(err.to_string().contains("not found"), "unexpected error: {err}");
    }

    #[test]
    fn parses_update_email_with_global_flags() {
        let cli = Cli::try_parse_from([
            "employee",
            "--json",
            "update-email",
            "3",
            "new@example.com",
            "--db",
            "/tmp/x.db",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/x.db")));
        assert!(matches!(
            cli.command,
            Commands::UpdateEmail { id: 3, ref email } if email == "new@example.com"
        ));
    }

    #[test]
    fn format_row_is_tab_separated() {
        let employee = Employee::builder()
            .id(1)
            .first_name("Peeku")
            .last_name("Neeku")
            .email("p@example.com")
            .build();
        assert_eq!(format_row(&employee), "1\tPeeku Neeku\tp@example.com");
    }
}
