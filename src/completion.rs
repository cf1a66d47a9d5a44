//! Bash completion.
//!
//! Completes subcommands, and snapshot names after the commands that take
//! one. Names come from `envsnap list`, run with whatever `--store-dir` or
//! `--config` is already on the command line.

const SUBCOMMANDS: &[&str] = &["save", "view", "report", "restore", "list", "completion"];
const NAMED: &[&str] = &["view", "report", "restore"];

pub fn bash_script() -> String {
    format!(
        r#"# envsnap bash completion
# enable with: source <(envsnap completion)
_envsnap_complete() {{
    local cur word cmd="" positional=0 i
    local -a store_opts=()
    cur="${{COMP_WORDS[COMP_CWORD]}}"

    case "${{COMP_WORDS[COMP_CWORD-1]}}" in
        --store-dir|--config) return ;;
    esac

    for ((i = 1; i < COMP_CWORD; i++)); do
        word="${{COMP_WORDS[i]}}"
        case "$word" in
            --store-dir|--config)
                store_opts+=("$word" "${{COMP_WORDS[i+1]}}")
                i=$((i + 1))
                ;;
            --store-dir=*|--config=*)
                store_opts+=("$word")
                ;;
            -*)
                ;;
            *)
                if [[ -z $cmd ]]; then
                    cmd="$word"
                else
                    positional=$((positional + 1))
                fi
                ;;
        esac
    done

    if [[ -z $cmd ]]; then
        COMPREPLY=($(compgen -W "{subcommands}" -- "$cur"))
    elif [[ $positional -eq 0 ]]; then
        case "$cmd" in
            {named})
                local snapshots
                snapshots=$(envsnap "${{store_opts[@]}}" list 2>/dev/null)
                COMPREPLY=($(compgen -W "$snapshots" -- "$cur"))
                ;;
        esac
    fi
}}

complete -o default -F _envsnap_complete envsnap
"#,
        subcommands = SUBCOMMANDS.join(" "),
        named = NAMED.join("|"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_registers_completion() {
        let script = bash_script();
        assert!(script.contains("complete -o default -F _envsnap_complete envsnap"));
        assert!(script.contains("save view report restore list completion"));
        assert!(script.contains("view|report|restore)"));
    }

    #[test]
    fn braces_are_balanced() {
        let script = bash_script();
        assert_eq!(script.matches('{').count(), script.matches('}').count());
    }

    #[cfg(unix)]
    #[test]
    fn script_is_valid_bash() {
        let Ok(out) = std::process::Command::new("bash").arg("-n").arg("-c").arg(bash_script()).output() else {
            return; // no bash on this machine
        };
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    }

    /// Runs the completion function for `words` (the last one being the word
    /// under the cursor) against a stub `envsnap` that only knows the store
    /// at `/snaps`. `None` when bash is unavailable.
    #[cfg(unix)]
    fn complete(words: &[&str]) -> Option<String> {
        let quoted: Vec<String> = words.iter().map(|w| format!("'{w}'")).collect();

        let mut script = bash_script();
        script.push_str(
            "envsnap() { [[ \"$*\" == \"--store-dir /snaps list\" ]] && printf 'alpha\\nbeta\\n'; }\n",
        );
        script.push_str(&format!("COMP_WORDS=({})\n", quoted.join(" ")));
        script.push_str(&format!("COMP_CWORD={}\n", words.len() - 1));
        script.push_str("_envsnap_complete\necho \"${COMPREPLY[*]}\"\n");

        let out = std::process::Command::new("bash").arg("-c").arg(script).output().ok()?;
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    #[cfg(unix)]
    #[test]
    fn subcommands_complete_after_global_flags() {
        let Some(reply) = complete(&["envsnap", "-v", ""]) else { return };
        assert_eq!(reply, "save view report restore list completion");

        let Some(reply) = complete(&["envsnap", "--store-dir", "/snaps", "re"]) else { return };
        assert_eq!(reply, "report restore");
    }

    #[cfg(unix)]
    #[test]
    fn names_come_from_the_given_store() {
        let Some(reply) = complete(&["envsnap", "--store-dir", "/snaps", "view", ""]) else { return };
        assert_eq!(reply, "alpha beta");

        let Some(reply) = complete(&["envsnap", "-q", "--store-dir", "/snaps", "restore", "b"]) else { return };
        assert_eq!(reply, "beta");

        // default store is empty for the stub
        let Some(reply) = complete(&["envsnap", "view", ""]) else { return };
        assert_eq!(reply, "");
    }

    #[cfg(unix)]
    #[test]
    fn only_the_first_argument_is_a_name() {
        let Some(reply) = complete(&["envsnap", "--store-dir", "/snaps", "view", "alpha", ""]) else { return };
        assert_eq!(reply, "");

        let Some(reply) = complete(&["envsnap", "--store-dir", "/snaps", "list", ""]) else { return };
        assert_eq!(reply, "");
    }
}
