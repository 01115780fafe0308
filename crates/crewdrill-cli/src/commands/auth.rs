//! Account commands: register, login, logout, whoami, recover.

use std::path::PathBuf;

use anyhow::Result;

use crewdrill_core::model::RecoveryAnswers;
use crewdrill_core::session::Router;
use crewdrill_core::traits::Registration;

use super::{app_context, flag_or_prompt, present_error};

pub async fn register(
    config: Option<PathBuf>,
    name: String,
    email: String,
    password: Option<String>,
    mother: String,
    color: String,
) -> Result<()> {
    let ctx = app_context(config)?;
    let password = flag_or_prompt(password, "Password")?;

    let registration = Registration {
        name,
        email,
        password,
        recovery: RecoveryAnswers {
            mother_name: mother,
            favorite_color: color,
        },
    };

    let user = ctx
        .engine
        .sign_up(&registration)
        .await
        .map_err(present_error)?;

    println!("Welcome aboard, {}!", user.name);
    println!(
        "Your account starts as {} with phase {} unlocked.",
        user.role,
        user.unlocked_phases
            .first()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "none".into())
    );
    println!("Sign in with: crewdrill login --email {}", user.email);
    Ok(())
}

pub async fn login(
    config: Option<PathBuf>,
    email: String,
    password: Option<String>,
) -> Result<()> {
    let ctx = app_context(config)?;
    let password = flag_or_prompt(password, "Password")?;

    let user = ctx
        .engine
        .sign_in(&email, &password)
        .await
        .map_err(present_error)?;

    let mut router = Router::new();
    let landing = router.login(user.clone());

    println!("Signed in as {} ({}).", user.name, user.role);
    println!("Landing screen: {landing}.");
    Ok(())
}

pub async fn logout(config: Option<PathBuf>) -> Result<()> {
    let ctx = app_context(config)?;
    ctx.engine.sign_out().await.map_err(present_error)?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config: Option<PathBuf>) -> Result<()> {
    let ctx = app_context(config)?;
    match ctx.engine.restore_session().await.map_err(present_error)? {
        Some(user) => {
            println!("{} <{}> — {}", user.name, user.email, user.role);
            println!(
                "Score {} | {} correct of {} answered | {} phase(s) completed",
                user.stats.score,
                user.stats.correct_answers,
                user.stats.questions_answered,
                user.stats.completed_phases.len(),
            );
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

pub async fn recover(
    config: Option<PathBuf>,
    email: String,
    mother: Option<String>,
    color: Option<String>,
    new_password: Option<String>,
) -> Result<()> {
    let ctx = app_context(config)?;

    println!("Answer the recovery questions for {email}.");
    let attempt = RecoveryAnswers {
        mother_name: flag_or_prompt(mother, "Mother's name")?,
        favorite_color: flag_or_prompt(color, "Favorite color")?,
    };
    let new_password = flag_or_prompt(new_password, "New password")?;

    ctx.engine
        .recover_access(&email, &attempt, &new_password)
        .await
        .map_err(present_error)?;

    println!("Password updated. Sign in with: crewdrill login --email {email}");
    Ok(())
}
