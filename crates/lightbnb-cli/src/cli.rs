use lightbnb_db::PropertyFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    User,
    Properties,
    Reservations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help(HelpTopic),
    User(UserArgs),
    Properties(PropertiesArgs),
    Reservations(ReservationsArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Overrides `DATABASE_URL` / `PG*` from the environment.
    pub database: Option<String>,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Email(String),
    Id(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    pub global: GlobalArgs,
    pub lookup: UserLookup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertiesArgs {
    pub global: GlobalArgs,
    pub filter: PropertyFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationsArgs {
    pub global: GlobalArgs,
    pub guest_id: i32,
    pub limit: Option<i64>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "user" => parse_user(it.map(|s| s.as_str())),
        "properties" => parse_properties(it.map(|s| s.as_str())),
        "reservations" => parse_reservations(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Split `--flag=value` or take the value from the next token.
fn flag_value<'a>(
    token: &'a str,
    flag: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<&'a str>> {
    if token == flag {
        let Some(v) = it.next() else {
            anyhow::bail!("{flag} requires a value");
        };
        return Ok(Some(v));
    }
    Ok(token
        .strip_prefix(flag)
        .and_then(|rest| rest.strip_prefix('=')))
}

fn parse_number<T: std::str::FromStr>(flag: &str, v: &str) -> anyhow::Result<T> {
    v.parse()
        .map_err(|_| anyhow::anyhow!("{flag} expects a number, got {v:?}"))
}

/// Handle a global option; returns `false` if `token` is not one.
fn parse_global<'a>(
    token: &'a str,
    it: &mut impl Iterator<Item = &'a str>,
    global: &mut GlobalArgs,
) -> anyhow::Result<bool> {
    if token == "--json" {
        global.json = true;
        return Ok(true);
    }
    if let Some(v) = flag_value(token, "--database", it)? {
        global.database = Some(v.to_string());
        return Ok(true);
    }
    Ok(false)
}

fn parse_user<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut lookup: Option<UserLookup> = None;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::User));
        }
        if parse_global(token, &mut it, &mut global)? {
            continue;
        }
        if let Some(v) = flag_value(token, "--email", &mut it)? {
            lookup = Some(UserLookup::Email(v.to_string()));
        } else if let Some(v) = flag_value(token, "--id", &mut it)? {
            lookup = Some(UserLookup::Id(parse_number("--id", v)?));
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(lookup) = lookup else {
        anyhow::bail!("user requires --email or --id");
    };
    Ok(Command::User(UserArgs { global, lookup }))
}

fn parse_properties<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut filter = PropertyFilter::new();

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Properties));
        }
        if parse_global(token, &mut it, &mut global)? {
            continue;
        }
        if let Some(v) = flag_value(token, "--city", &mut it)? {
            filter.city = Some(v.to_string());
        } else if let Some(v) = flag_value(token, "--owner-id", &mut it)? {
            filter.owner_id = Some(parse_number("--owner-id", v)?);
        } else if let Some(v) = flag_value(token, "--min-price", &mut it)? {
            filter.minimum_price_per_night = Some(parse_number("--min-price", v)?);
        } else if let Some(v) = flag_value(token, "--max-price", &mut it)? {
            filter.maximum_price_per_night = Some(parse_number("--max-price", v)?);
        } else if let Some(v) = flag_value(token, "--min-rating", &mut it)? {
            filter.minimum_rating = Some(parse_number("--min-rating", v)?);
        } else if let Some(v) = flag_value(token, "--limit", &mut it)? {
            filter.limit = Some(parse_number("--limit", v)?);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    if filter.minimum_price_per_night.is_some() != filter.maximum_price_per_night.is_some() {
        anyhow::bail!("--min-price and --max-price must be given together");
    }

    Ok(Command::Properties(PropertiesArgs { global, filter }))
}

fn parse_reservations<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut global = GlobalArgs::default();
    let mut guest_id: Option<i32> = None;
    let mut limit: Option<i64> = None;

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Reservations));
        }
        if parse_global(token, &mut it, &mut global)? {
            continue;
        }
        if let Some(v) = flag_value(token, "--guest-id", &mut it)? {
            guest_id = Some(parse_number("--guest-id", v)?);
        } else if let Some(v) = flag_value(token, "--limit", &mut it)? {
            limit = Some(parse_number("--limit", v)?);
        } else {
            anyhow::bail!("unknown argument: {token}");
        }
    }

    let Some(guest_id) = guest_id else {
        anyhow::bail!("reservations requires --guest-id");
    };
    Ok(Command::Reservations(ReservationsArgs {
        global,
        guest_id,
        limit,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
lightbnb - query the LightBnB database

USAGE:
  lightbnb <COMMAND> [OPTIONS]

COMMANDS:
  user            Look up a user by email or id
  properties      Search property listings
  reservations    List a guest's past reservations

GLOBAL OPTIONS:
  --database <URL>      Database URL (default: DATABASE_URL or PG* variables)
  --json                Print JSON instead of a table

Run `lightbnb <command> --help` for more."
            );
        }
        HelpTopic::User => {
            println!(
                "\
USAGE:
  lightbnb user --email <EMAIL>
  lightbnb user --id <ID>

OPTIONS:
  --email <EMAIL>       Exact, case-sensitive email
  --id <ID>             User id
  -h, --help            Print help"
            );
        }
        HelpTopic::Properties => {
            println!(
                "\
USAGE:
  lightbnb properties [OPTIONS]

OPTIONS:
  --city <TEXT>         City contains TEXT (case-sensitive)
  --owner-id <ID>       Owned by user ID
  --min-price <DOLLARS> Minimum nightly price (requires --max-price)
  --max-price <DOLLARS> Maximum nightly price (requires --min-price)
  --min-rating <R>      Minimum average review rating
  --limit <N>           Maximum rows (default: 10)
  -h, --help            Print help"
            );
        }
        HelpTopic::Reservations => {
            println!(
                "\
USAGE:
  lightbnb reservations --guest-id <ID> [OPTIONS]

OPTIONS:
  --guest-id <ID>       Guest user id
  --limit <N>           Maximum rows (default: 10)
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("lightbnb")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_args_prints_help() {
        assert_eq!(
            parse_args(&args(&[])).unwrap(),
            Command::Help(HelpTopic::Root)
        );
    }

    #[test]
    fn parse_user_by_email() {
        let cmd = parse_args(&args(&["user", "--email", "a@b.c", "--json"])).unwrap();
        let Command::User(user) = cmd else {
            panic!("expected user");
        };
        assert_eq!(user.lookup, UserLookup::Email("a@b.c".into()));
        assert!(user.global.json);
    }

    #[test]
    fn parse_user_requires_lookup() {
        assert!(parse_args(&args(&["user"])).is_err());
        assert!(parse_args(&args(&["user", "--id", "x"])).is_err());
    }

    #[test]
    fn parse_properties_filter() {
        let cmd = parse_args(&args(&[
            "properties",
            "--city=Vancouver",
            "--min-price",
            "50",
            "--max-price",
            "150",
            "--min-rating",
            "4.5",
            "--limit",
            "5",
            "--database",
            "postgres://localhost/lightbnb",
        ]))
        .unwrap();
        let Command::Properties(p) = cmd else {
            panic!("expected properties");
        };
        assert_eq!(
            p.filter,
            PropertyFilter::new()
                .city("Vancouver")
                .price_range(50, 150)
                .minimum_rating(4.5)
                .limit(5)
        );
        assert_eq!(
            p.global.database.as_deref(),
            Some("postgres://localhost/lightbnb")
        );
    }

    #[test]
    fn parse_properties_rejects_one_sided_price() {
        assert!(parse_args(&args(&["properties", "--min-price", "50"])).is_err());
    }

    #[test]
    fn parse_reservations() {
        let cmd = parse_args(&args(&["reservations", "--guest-id", "3", "--limit=2"])).unwrap();
        assert_eq!(
            cmd,
            Command::Reservations(ReservationsArgs {
                global: GlobalArgs::default(),
                guest_id: 3,
                limit: Some(2),
            })
        );
    }

    #[test]
    fn unknown_argument_is_an_error() {
        let err = parse_args(&args(&["reservations", "--guest", "3"])).unwrap_err();
        assert!(err.to_string().contains("unknown argument"));
    }
}
