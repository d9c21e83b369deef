use std::{
    convert::Infallible,
    env,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port: u16 = env::var("PORT")?.parse()?;
    let ai_endpoint: hyper::Uri = env::var("AI_ENDPOINT")?.parse()?;
    let ai_key: hyper::header::HeaderValue = env::var("AI_API_KEY")?.parse()?;
    let auth = api::auth::Params {
        client_id: env::var("OAUTH_CLIENT_ID")?.into_boxed_str(),
        client_secret: env::var("OAUTH_CLIENT_SECRET")?.into_boxed_str(),
        authorize_endpoint: env::var("OAUTH_AUTHORIZE_ENDPOINT")?.into_boxed_str(),
        token_endpoint: env::var("OAUTH_TOKEN_ENDPOINT")?.parse()?,
        user_endpoint: env::var("OAUTH_USER_ENDPOINT")?.parse()?,
        redirect_uri: env::var("OAUTH_REDIRECT_URI")?.into_boxed_str(),
    };

    let mut config = db::Config::new();
    config
        .user(&env::var("PG_USERNAME")?)
        .password(env::var("PG_PASSWORD")?)
        .host(&env::var("PG_HOSTNAME")?)
        .dbname(&env::var("PG_DATABASE")?);
    config.port(match env::var("PG_PORT") {
        Ok(port) => port.parse()?,
        _ => 5432,
    });

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let (client, connection) = config.connect(db::NoTls).await?;
        let postgres = tokio::spawn(connection);

        let ai = api::ai::Client::new(ai_endpoint, ai_key);
        let app = Arc::new(api::App::new(client.into(), ai, auth.into()));

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("listening on {addr}");

        loop {
            let (stream, remote) = tokio::select! {
                result = listener.accept() => result?,
                _ = tokio::signal::ctrl_c() => break,
            };
            let outer = app.clone();
            tokio::spawn(async move {
                let service = hyper::service::service_fn(move |req| {
                    let inner = outer.clone();
                    async move { Ok::<_, Infallible>(inner.respond(req).await) }
                });
                if let Err(err) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(hyper_util::rt::TokioIo::new(stream), service)
                    .await
                {
                    log::error!("connection error from {remote}: {err}");
                }
            });
        }

        log::info!("shutting down");
        postgres.abort();
        anyhow::Ok(())
    })
}
