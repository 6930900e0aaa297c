use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wireframe::http::{Environ, Request, Response};
use wireframe::processor::BasicAuth;
use wireframe::{chain, Matcher, MethodMap, Outcome, Wireframe};

fn hello(req: &mut Request, res: &mut Response) -> Outcome {
    let (name, age) = (req.get("name")?, req.get("age")?);
    res.append(format!("Hello, {} year old named {}!", age, name));
    Ok(())
}

fn secret(req: &mut Request, res: &mut Response) -> Outcome {
    res.append(format!("Welcome back, {}.", req.user().unwrap_or_default()));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wireframe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = Wireframe::new()
        .map(Matcher::route("/hello/:name/:age")?, MethodMap::new().get(hello))?
        .map("^/secret$", MethodMap::new().get(chain![BasicAuth::new("demo"), secret]))?;

    for environ in [
        Environ::new("GET", "/hello/ferris/7"),
        Environ::new("POST", "/hello/ferris/7"),
        Environ::new("GET", "/secret"),
        Environ::new("GET", "/secret").header("Authorization", "Basic ZmVycmlzOmNyYWI="),
        Environ::new("GET", "/missing"),
    ] {
        let wire = app.serve(environ)?.serialize();
        println!("{} {}", wire.status_line, String::from_utf8_lossy(&wire.body));
    }

    Ok(())
}
