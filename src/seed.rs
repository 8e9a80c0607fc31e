use crate::appstate::AppState;
use crate::auth::user;
use crate::auth::user::Credentials;
use crate::joke::NewJoke;
use crate::known_errors::JokesResult;

const DEV_USERNAME: &str = "kody";
const DEV_PASSWORD: &str = "twixrox";

const DEV_JOKES: &[(&str, &str)] = &[
    (
        "Road worker",
        "I never wanted to believe that my Dad was stealing from his job as a road worker. But when I got home, all the signs were there.",
    ),
    (
        "Frisbee",
        "I was wondering why the frisbee was getting bigger, then it hit me.",
    ),
    (
        "Trees",
        "Why do trees seem suspicious on sunny days? Dunno, they're just a bit shady.",
    ),
    (
        "Skeletons",
        "Why don't skeletons ride roller coasters? They don't have the stomach for it.",
    ),
    (
        "Hippos",
        "Why don't you find hippopotamuses hiding in trees? They're really good at it.",
    ),
    (
        "Dinner",
        "What did one plate say to the other plate? Dinner is on me!",
    ),
    (
        "Elevator",
        "My first time using an elevator was an uplifting experience. The second time let me down.",
    ),
];

/// Creates the dev user and its jokes unless the user already exists.
pub(crate) async fn seed_dev_data(state: &AppState) -> JokesResult<()> {
    if state.users.find_by_username(DEV_USERNAME).await?.is_some() {
        tracing::info!("dev data already present");
        return Ok(());
    }

    let creds = Credentials {
        username: DEV_USERNAME.to_string(),
        password: DEV_PASSWORD.to_string(),
    };
    let Some(kody) = user::register(state.users.as_ref(), creds, state.settings.bcrypt_cost).await?
    else {
        return Ok(());
    };

    for (name, content) in DEV_JOKES {
        state
            .jokes
            .create(NewJoke {
                user_id: kody.id,
                name: name.to_string(),
                content: content.to_string(),
            })
            .await?;
    }

    tracing::info!(jokes = DEV_JOKES.len(), "seeded dev data");
    Ok(())
}
