use super::*;

fn status_err(status: u16, message: &str) -> anyhow::Error {
    RemoteStatusError {
        status,
        message: message.to_string(),
    }
    .into()
}

#[test]
fn client_errors_are_not_retried() {
    let mut calls = 0;
    let res: Result<()> = with_retries("compare branches", || {
        calls += 1;
        Err(status_err(404, "branch not found"))
    });

    let err = res.unwrap_err();
    assert_eq!(calls, 1);
    let status = err.downcast_ref::<RemoteStatusError>().unwrap();
    assert_eq!(status.message, "branch not found");
    assert_eq!(format!("{:#}", err), "compare branches: branch not found");
}

#[test]
fn server_errors_are_retried_until_success() {
    let mut calls = 0;
    let res = with_retries("get listing", || {
        calls += 1;
        if calls < 3 {
            Err(status_err(502, "bad gateway"))
        } else {
            Ok(calls)
        }
    });

    assert_eq!(res.unwrap(), 3);
}

#[test]
fn gives_up_after_last_attempt() {
    let mut calls = 0;
    let res: Result<()> = with_retries("get project", || {
        calls += 1;
        Err(anyhow::anyhow!("connection refused"))
    });

    assert_eq!(calls, ATTEMPTS);
    assert_eq!(
        format!("{:#}", res.unwrap_err()),
        "get project: connection refused"
    );
}
