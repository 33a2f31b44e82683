use anyhow::{Result, bail};
use stayhub_application::AppContext;
use stayhub_core::session::Profile;

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    let profile = ctx.auth().login(email, password).await?;
    println!("Signed in as {}", describe(&profile));
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.auth().logout().await?;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(ctx: &AppContext, remote: bool) -> Result<()> {
    let auth = ctx.auth();
    if !auth.is_authenticated() {
        bail!("Not signed in. Run `stayhub login` first.");
    }

    let profile = if remote {
        auth.fetch_me(true).await?
    } else {
        match auth.current_profile() {
            Some(profile) => profile,
            None => bail!("No stored profile"),
        }
    };
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn describe(profile: &Profile) -> String {
    match (&profile.name, &profile.email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => profile.id.clone(),
    }
}
