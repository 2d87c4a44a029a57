//! Prints `EXISTS` when a user with `$DJANGO_SUPERUSER_EMAIL` is already in
//! RapidPro's database. Prints nothing otherwise. Always exits 0.

use konexpro_branding::logging::init_logger;
use konexpro_branding::user_store::{
    check_superuser, PsqlUserStore, EXISTS_TOKEN, SUPERUSER_EMAIL_ENV,
};

fn main() {
    // Quiet by default: provisioning parses this tool's output
    init_logger("warn");

    let email = std::env::var(SUPERUSER_EMAIL_ENV).ok();
    let store = PsqlUserStore::from_env();

    if check_superuser(&store, email.as_deref()) {
        println!("{}", EXISTS_TOKEN);
    }
}
