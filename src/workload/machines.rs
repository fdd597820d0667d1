/// A host environment the execution backend can start
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Machine {
    /// Host id, shows up as `container_name` in the report
    pub name: &'static str,
    /// Container image
    pub image: &'static str,
}

/// Machines known to the execution backend
pub const MACHINES: [Machine; 11] = [
    Machine {
        name: "Ubuntu20.04",
        image: "ubuntu:20.04",
    },
    Machine {
        name: "Ubuntu22.04",
        image: "ubuntu:22.04",
    },
    Machine {
        name: "Ubuntu24.04",
        image: "ubuntu:24.04",
    },
    Machine {
        name: "Ubuntu24.10",
        image: "ubuntu:24.10",
    },
    Machine {
        name: "Ubuntu25.04",
        image: "ubuntu:25.04",
    },
    Machine {
        name: "DebianBullseye",
        image: "debian:bullseye",
    },
    Machine {
        name: "DebianBookworm",
        image: "debian:bookworm",
    },
    Machine {
        name: "OracleLinux9",
        image: "oraclelinux:9",
    },
    Machine {
        name: "OracleLinux8.10",
        image: "oraclelinux:8.10",
    },
    Machine {
        name: "OracleLinux8",
        image: "oraclelinux:8",
    },
    Machine {
        name: "AmazonLinux2023",
        image: "amazonlinux:2023",
    },
];

/// Look up a machine by name
#[must_use]
pub fn find(name: &str) -> Option<&'static Machine> {
    MACHINES.iter().find(|m| m.name == name)
}
