use crate::infra::{configured_geocoder, local_hub};
use clap::Args;
use renthub::config::AppConfig;
use renthub::domain::{RequestOutcome, UserRole};
use renthub::error::AppError;
use renthub::geocoding::{AutocompleteSession, GeocodingError, MIN_QUERY_CHARS};
use renthub::workflows::access::SignUpForm;
use renthub::workflows::listings::{ListingScope, PropertyDraft};
use std::time::Duration;

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Offer submitted by the first client
    #[arg(long, default_value_t = 1000.0)]
    pub(crate) first_offer: f64,
    /// Offer submitted by the second client; this is the one the landlord accepts
    #[arg(long, default_value_t = 1200.0)]
    pub(crate) second_offer: f64,
}

#[derive(Args, Debug)]
pub(crate) struct GeocodeArgs {
    /// Partial address to complete
    pub(crate) text: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        first_offer,
        second_offer,
    } = args;

    let hub = local_hub();
    let join = |email: &str, role: UserRole| -> Result<_, AppError> {
        let signed_in = hub.access.sign_up(SignUpForm {
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
            role,
        })?;
        println!(
            "- {} signed up as {} -> {:?} home",
            email, role, signed_in.home
        );
        Ok(hub.access.viewer(Some(&signed_in.session.token))?)
    };

    println!("RentHub workflow demo");
    let landlord = join("landlord@renthub.local", UserRole::Landlord)?;
    let ana = join("ana@renthub.local", UserRole::Client)?;
    let ben = join("ben@renthub.local", UserRole::Client)?;

    let property = hub.listings.add_property(
        &landlord,
        PropertyDraft {
            title: "Two bedroom by the park".to_string(),
            description: "Bright corner unit with in-suite laundry".to_string(),
            address: "100 Queen St W, Toronto, ON".to_string(),
            price: "$1,500".to_string(),
            location: None,
        },
    )?;
    println!(
        "\nListed {} '{}' at ${:.2}/month",
        property.id, property.title, property.price
    );

    hub.shortlist.shortlist(&ana, &property.id)?;
    let r1 = hub
        .requests
        .create_request(&ana, &property.id, first_offer)?;
    let r2 = hub
        .requests
        .create_request(&ben, &property.id, second_offer)?;

    let pending = hub.requests.pending_requests(&landlord, &property.id)?;
    println!(
        "Pending offers (listed at ${:.2}):",
        pending.listed_price
    );
    for request in &pending.requests {
        println!(
            "  - {} from {}: ${:.2}",
            request.id, request.user_email, request.offered_price
        );
    }

    let outcome = hub
        .requests
        .accept_request(&landlord, &r2.id, &property.id)?;
    println!(
        "\nAccepted {} ({}); denied {} other offer(s); property listed: {}",
        outcome.accepted.id,
        outcome.accepted.user_email,
        outcome.denied.len(),
        outcome.property.listed
    );

    for request in hub.requests.requests_for_user(&ana)? {
        let note = match request.outcome {
            RequestOutcome::Denied if request.id == r1.id => " (superseded)",
            _ => "",
        };
        println!("  {} sees {} -> {}{}", ana.email, request.id, request.outcome, note);
    }

    let browse = hub.listings.list_properties(&ana, ListingScope::Browse)?;
    let mine = hub.listings.list_properties(&landlord, ListingScope::Mine)?;
    println!(
        "Client browse list: {} properties | landlord portfolio: {} properties",
        browse.len(),
        mine.len()
    );

    Ok(())
}

/// Feeds the text through a debounced session one keystroke at a time, the way
/// the address field does, and prints whatever the final lookup returns.
pub(crate) async fn run_geocode(args: GeocodeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let geocoder = configured_geocoder(&config.geocoding).ok_or(GeocodingError::Disabled)?;

    let text = args.text.trim();
    if text.chars().count() <= MIN_QUERY_CHARS {
        println!(
            "Type more than {} characters to get suggestions",
            MIN_QUERY_CHARS
        );
        return Ok(());
    }

    let mut session = AutocompleteSession::new(geocoder, config.geocoding.debounce);
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        session.input(&typed);
    }

    let mut updates = session.subscribe();
    let wait = config.geocoding.debounce + Duration::from_secs(15);
    if tokio::time::timeout(wait, updates.changed()).await.is_err() {
        println!("No suggestions arrived within {:?}", wait);
        return Ok(());
    }

    let suggestions = session.suggestions();
    if suggestions.is_empty() {
        println!("No suggestions for '{}'", text);
    }
    for suggestion in suggestions {
        println!(
            "- {} ({:.5}, {:.5})",
            suggestion.formatted, suggestion.latitude, suggestion.longitude
        );
    }
    Ok(())
}
