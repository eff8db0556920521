use super::*;

#[test]
fn parses_multi_word_search_query() {
    let cli = Cli::try_parse_from(["pharmalocate", "search", "24", "hour", "pharmacy"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Search {
            ref query,
            with_hours: false,
            json: false,
        } if query.join(" ") == "24 hour pharmacy"
    ));
}

#[test]
fn search_without_query_is_allowed() {
    let cli = Cli::try_parse_from(["pharmalocate", "search", "--with-hours", "--json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Search {
            ref query,
            with_hours: true,
            json: true,
        } if query.is_empty()
    ));
}

#[test]
fn global_position_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from([
        "pharmalocate",
        "pincode",
        "--lat",
        "-33.86",
        "--lon",
        "151.2",
    ])
    .expect("expected valid cli args");

    assert_eq!(
        cli.position_override(),
        Some(Coordinates::new(-33.86, 151.2))
    );
    assert!(matches!(cli.command, Commands::Pincode { json: false }));
}

#[test]
fn latitude_without_longitude_is_rejected() {
    let result = Cli::try_parse_from(["pharmalocate", "--lat", "12.97", "search"]);
    assert!(result.is_err());
}

#[test]
fn no_position_flags_means_no_override() {
    let cli = Cli::try_parse_from(["pharmalocate", "pincode"]).expect("expected valid cli args");
    assert!(cli.position_override().is_none());
}

#[test]
fn stock_requires_medicine() {
    assert!(Cli::try_parse_from(["pharmalocate", "stock", "Apollo"]).is_err());

    let cli = Cli::try_parse_from([
        "pharmalocate",
        "stock",
        "Apollo",
        "Indiranagar",
        "--medicine",
        "Paracetamol",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Stock { ref pharmacy, ref medicine }
            if pharmacy.join(" ") == "Apollo Indiranagar" && medicine == "Paracetamol"
    ));
}

#[test]
fn stock_requires_pharmacy_name() {
    assert!(Cli::try_parse_from(["pharmalocate", "stock", "--medicine", "Aspirin"]).is_err());
}

#[test]
fn parses_scan_with_search() {
    let cli = Cli::try_parse_from(["pharmalocate", "scan", "rx.jpg", "--search"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Scan {
            ref image,
            search: true,
            json: false,
        } if image == &PathBuf::from("rx.jpg")
    ));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["pharmalocate"]).is_err());
}
