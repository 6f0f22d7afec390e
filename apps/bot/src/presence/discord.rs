use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use serenity::all::{
    ActivityData, ClientBuilder, Context, EditRole, EventHandler, GatewayIntents, Guild, GuildId,
    Http, Ready, RoleId, ShardMessenger, UserId,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, warn};

use super::{PlatformError, PresencePublisher};
use crate::display::RoleColor;

#[derive(Clone)]
struct Session {
    shard: ShardMessenger,
    http: Arc<Http>,
    user_id: UserId,
    guilds: Vec<GuildId>,
}

struct Handler {
    session: watch::Sender<Option<Session>>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            user_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "connected successfully"
        );

        self.session.send_replace(Some(Session {
            shard: ctx.shard.clone(),
            http: Arc::clone(&ctx.http),
            user_id: ready.user.id,
            guilds: ready.guilds.iter().map(|g| g.id).collect(),
        }));
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: Option<bool>) {
        if is_new != Some(true) {
            return;
        }

        info!(guild_id = %guild.id, name = %guild.name, "joined guild");
        self.session.send_modify(|session| {
            if let Some(session) = session
                && !session.guilds.contains(&guild.id)
            {
                session.guilds.push(guild.id);
            }
        });
    }
}

/// Publishes presence through a serenity gateway session owned by this value.
pub struct DiscordPublisher {
    session: watch::Receiver<Option<Session>>,
    roles: Mutex<HashMap<GuildId, RoleId>>,
    client_task: JoinHandle<()>,
}

impl DiscordPublisher {
    pub async fn connect(token: &str) -> Result<Self, PlatformError> {
        let (tx, rx) = watch::channel(None);

        let mut client = ClientBuilder::new(token, GatewayIntents::GUILDS)
            .event_handler(Handler { session: tx })
            .await?;

        let client_task = tokio::spawn(async move {
            if let Err(why) = client.start().await {
                error!("Client error: {why:?}");
            }
        });

        Ok(Self {
            session: rx,
            roles: Mutex::new(HashMap::new()),
            client_task,
        })
    }

    fn session(&self) -> Result<Session, PlatformError> {
        self.session.borrow().clone().ok_or(PlatformError::NotReady)
    }

    async fn bot_role(&self, session: &Session, guild: GuildId) -> Result<RoleId, PlatformError> {
        let cached = self.roles.lock().get(&guild).copied();
        if let Some(role) = cached {
            return Ok(role);
        }

        let roles = guild.roles(&session.http).await?;
        let role = roles
            .values()
            .find(|role| role.tags.bot_id == Some(session.user_id))
            .map(|role| role.id)
            .ok_or(PlatformError::RoleNotFound(guild.get()))?;

        debug!(guild_id = %guild, role_id = %role, "resolved bot role");
        self.roles.lock().insert(guild, role);
        Ok(role)
    }

    async fn set_color_in(
        &self,
        session: &Session,
        guild: GuildId,
        color: RoleColor,
    ) -> Result<(), PlatformError> {
        let role = self.bot_role(session, guild).await?;
        guild
            .edit_role(&*session.http, role, EditRole::new().colour(color.0))
            .await?;
        Ok(())
    }
}

impl Drop for DiscordPublisher {
    fn drop(&mut self) {
        self.client_task.abort();
    }
}

#[async_trait]
impl PresencePublisher for DiscordPublisher {
    async fn ready(&self) -> Result<(), PlatformError> {
        let mut session = self.session.clone();
        session
            .wait_for(Option::is_some)
            .await
            .map(|_| ())
            .map_err(|_| PlatformError::Disconnected)
    }

    async fn set_nickname(&self, text: &str) -> Result<(), PlatformError> {
        let session = self.session()?;
        let mut first_err = None;

        for guild in &session.guilds {
            match guild.edit_nickname(&session.http, Some(text)).await {
                Ok(()) => debug!(guild_id = %guild, "updated nickname"),
                Err(e) => {
                    warn!(guild_id = %guild, error = %e, "nickname update failed");
                    first_err.get_or_insert(PlatformError::from(e));
                }
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    async fn set_color(&self, color: RoleColor) -> Result<(), PlatformError> {
        let session = self.session()?;
        let mut first_err = None;

        for guild in &session.guilds {
            match self.set_color_in(&session, *guild, color).await {
                Ok(()) => debug!(guild_id = %guild, color = color.0, "updated role color"),
                Err(e) => {
                    warn!(guild_id = %guild, error = %e, "role color update failed");
                    first_err.get_or_insert(e);
                }
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    async fn set_activity(&self, text: &str) -> Result<(), PlatformError> {
        let session = self.session()?;
        session
            .shard
            .set_activity(Some(ActivityData::watching(text)));
        Ok(())
    }
}
