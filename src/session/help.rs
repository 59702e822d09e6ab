// ABOUTME: Usage text printed by the help target

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [target] ARGS

  Targets:
    update     Upgrade geodesic wrapper shell
    stop       Stop a running shell
    uninstall  Remove geodesic image
    help       Show this message
    <empty>    Enter into a shell

  Arguments:
    --env-file=...    Pass an environment file containing key=value pairs
    --image=...       Image to run (E.g. --image=cloudposse/foobar.example.com:1.0)
    --tag=...         Tag of the default image
    --name=...        Name of the session container
    --port=...        Port published by the session
    --dns=...         DNS server for the container (macOS only)
    --local-home=...  Host directory mounted at /localhost
    --<other>=...     Passed into the container as <OTHER>=...
    KEY=value         Set a launcher variable (E.g. LOCAL_HOME=/data/me)
    -v, --verbose     Print debug output
    -h, --help        Show this message
    -- COMMAND...     Run COMMAND in the session instead of a login shell

"
    )
}
