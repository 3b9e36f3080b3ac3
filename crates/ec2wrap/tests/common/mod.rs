//! In-memory EC2 used by the integration tests
//!
//! `FakeEc2` keeps one store per EC2 family, answers describes with the same
//! filter and not-found behavior as EC2 for the keys the crate uses, records
//! every call and can be told to fail specific operations.

#![allow(dead_code)]

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use aws_sdk_ec2::types::{
    Address, DomainType, GroupIdentifier, Image, ImageState, Instance, InstanceState,
    InstanceStateName, InstanceType, IpPermission, Reservation, SecurityGroup, Snapshot,
    SnapshotState, StateReason, Subnet, Tag, Volume, VolumeAttachment, VolumeState, Vpc,
};
use ec2wrap::ec2::{AddressRef, CreateVolumeParams, DescribeRequest, Ec2Api, RunInstancesParams};
use ec2wrap::{AccountId, Connector, Ec2Connector, Settings};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const ACCOUNT_ID: &str = "123456789012";

/// Connector over `fake` with no tagging delay
pub fn connector(fake: &Arc<FakeEc2>) -> Arc<dyn Connector> {
    connector_with(fake, Settings::default())
}

pub fn connector_with(fake: &Arc<FakeEc2>, settings: Settings) -> Arc<dyn Connector> {
    let api: Arc<dyn Ec2Api> = fake.clone();
    Ec2Connector::new(
        api,
        AccountId::new(ACCOUNT_ID),
        settings.with_tag_delay(Duration::ZERO),
    )
    .shared()
}

pub fn tag(key: &str, value: &str) -> Tag {
    Tag::builder().key(key).value(value).build()
}

pub fn instance(id: &str, state: InstanceStateName) -> Instance {
    Instance::builder()
        .instance_id(id)
        .state(InstanceState::builder().name(state).build())
        .build()
}

pub fn volume(id: &str) -> Volume {
    Volume::builder()
        .volume_id(id)
        .state(VolumeState::Available)
        .build()
}

/// Field lookups the fake understands for describe filters
trait Described: Clone {
    fn id(&self) -> Option<&str>;
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>>;
    fn tag_list(&self) -> &[Tag];
    fn field(&self, name: &str) -> Vec<String>;
}

fn one(value: Option<&str>) -> Vec<String> {
    value.map(str::to_string).into_iter().collect()
}

impl Described for Instance {
    fn id(&self) -> Option<&str> {
        self.instance_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "private-ip-address" => one(self.private_ip_address()),
            "dns-name" => one(self.public_dns_name()),
            "subnet-id" => one(self.subnet_id()),
            "vpc-id" => one(self.vpc_id()),
            "instance-state-name" => one(
                self.state()
                    .and_then(|state| state.name())
                    .map(|name| name.as_str()),
            ),
            _ => Vec::new(),
        }
    }
}

impl Described for Volume {
    fn id(&self) -> Option<&str> {
        self.volume_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "attachment.instance-id" => self
                .attachments()
                .iter()
                .filter_map(|a| a.instance_id().map(str::to_string))
                .collect(),
            "attachment.device" => self
                .attachments()
                .iter()
                .filter_map(|a| a.device().map(str::to_string))
                .collect(),
            "status" => one(self.state().map(|state| state.as_str())),
            _ => Vec::new(),
        }
    }
}

impl Described for Snapshot {
    fn id(&self) -> Option<&str> {
        self.snapshot_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "owner-id" => one(self.owner_id()),
            "volume-id" => one(self.volume_id()),
            "status" => one(self.state().map(|state| state.as_str())),
            _ => Vec::new(),
        }
    }
}

impl Described for Address {
    fn id(&self) -> Option<&str> {
        self.public_ip()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "domain" => one(self.domain().map(|domain| domain.as_str())),
            "instance-id" => one(self.instance_id()),
            "allocation-id" => one(self.allocation_id()),
            _ => Vec::new(),
        }
    }
}

impl Described for SecurityGroup {
    fn id(&self) -> Option<&str> {
        self.group_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "group-name" => one(self.group_name()),
            "vpc-id" => one(self.vpc_id()),
            _ => Vec::new(),
        }
    }
}

impl Described for Subnet {
    fn id(&self) -> Option<&str> {
        self.subnet_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "vpc-id" => one(self.vpc_id()),
            "cidr-block" => one(self.cidr_block()),
            _ => Vec::new(),
        }
    }
}

impl Described for Vpc {
    fn id(&self) -> Option<&str> {
        self.vpc_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "cidr-block" => one(self.cidr_block()),
            _ => Vec::new(),
        }
    }
}

impl Described for Image {
    fn id(&self) -> Option<&str> {
        self.image_id()
    }
    fn tags_mut(&mut self) -> &mut Option<Vec<Tag>> {
        &mut self.tags
    }
    fn tag_list(&self) -> &[Tag] {
        self.tags()
    }
    fn field(&self, name: &str) -> Vec<String> {
        match name {
            "owner-id" => one(self.owner_id()),
            "is-public" => vec![self.public().unwrap_or(false).to_string()],
            "name" => one(self.name()),
            _ => Vec::new(),
        }
    }
}

fn matches<T: Described>(item: &T, request: &DescribeRequest) -> bool {
    if !request.ids.is_empty() && !item.id().is_some_and(|id| request.ids.iter().any(|r| r == id)) {
        return false;
    }
    if !request.owner_ids.is_empty()
        && !item
            .field("owner-id")
            .iter()
            .any(|owner| request.owner_ids.contains(owner))
    {
        return false;
    }

    request.filters.iter().all(|filter| {
        let values = filter.values();
        match filter.name().unwrap_or_default().strip_prefix("tag:") {
            Some(key) => item.tag_list().iter().any(|tag| {
                tag.key() == Some(key) && tag.value().is_some_and(|v| values.iter().any(|x| x == v))
            }),
            None => item
                .field(filter.name().unwrap_or_default())
                .iter()
                .any(|v| values.contains(v)),
        }
    })
}

/// Describe `items`; an explicit id that does not exist fails with `code`
fn describe<T: Described>(items: &[T], request: &DescribeRequest, code: &str) -> Result<Vec<T>> {
    for id in &request.ids {
        if !items.iter().any(|item| item.id() == Some(id.as_str())) {
            bail!("{}: The ID '{}' does not exist", code, id);
        }
    }
    Ok(items.iter().filter(|item| matches(*item, request)).cloned().collect())
}

fn remove<T: Described>(items: &mut Vec<T>, id: &str, code: &str) -> Result<()> {
    let before = items.len();
    items.retain(|item| item.id() != Some(id));
    if items.len() == before {
        bail!("{}: The ID '{}' does not exist", code, id);
    }
    Ok(())
}

fn find_mut<'a, T: Described>(items: &'a mut [T], id: &str, code: &str) -> Result<&'a mut T> {
    items
        .iter_mut()
        .find(|item| item.id() == Some(id))
        .ok_or_else(|| anyhow!("{}: The ID '{}' does not exist", code, id))
}

fn tag_item<T: Described>(items: &mut [T], id: &str, tags: &[Tag], add: bool) -> bool {
    let Some(item) = items.iter_mut().find(|item| item.id() == Some(id)) else {
        return false;
    };
    let current = item.tags_mut().get_or_insert_with(Vec::new);
    for tag in tags {
        current.retain(|existing| existing.key() != tag.key());
        if add {
            current.push(tag.clone());
        }
    }
    true
}

#[derive(Default)]
struct FakeState {
    instances: Vec<Instance>,
    volumes: Vec<Volume>,
    snapshots: Vec<Snapshot>,
    addresses: Vec<Address>,
    security_groups: Vec<SecurityGroup>,
    subnets: Vec<Subnet>,
    vpcs: Vec<Vpc>,
    images: Vec<Image>,
    calls: Vec<String>,
    /// (operation, target id or any) -> error message
    failures: Vec<(&'static str, Option<String>, String)>,
    last_launch: Option<RunInstancesParams>,
    launch_state: Option<InstanceStateName>,
    next_id: u32,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-fake{:04}", prefix, self.next_id)
    }
}

/// In-memory stand-in for EC2
#[derive(Default)]
pub struct FakeEc2 {
    state: Mutex<FakeState>,
}

impl FakeEc2 {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record a call and apply any injected failure
    fn call(&self, operation: &'static str, target: &str) -> Result<MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.calls.push(format!("{} {}", operation, target).trim_end().to_string());

        let failure = state.failures.iter().find(|(op, id, _)| {
            *op == operation && id.as_deref().is_none_or(|id| id == target)
        });
        if let Some((_, _, message)) = failure {
            bail!("{}", message);
        }
        Ok(state)
    }

    /// Fail every call of `operation`
    pub fn fail(&self, operation: &'static str, message: &str) {
        self.lock().failures.push((operation, None, message.to_string()));
    }

    /// Fail calls of `operation` that target `id`
    pub fn fail_for(&self, operation: &'static str, id: &str, message: &str) {
        self.lock()
            .failures
            .push((operation, Some(id.to_string()), message.to_string()));
    }

    /// Every call so far as `"<operation> <target>"`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Calls of one operation
    pub fn calls_of(&self, operation: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .collect()
    }

    pub fn last_launch(&self) -> Option<RunInstancesParams> {
        self.lock().last_launch.clone()
    }

    /// State newly launched instances start in (running by default)
    pub fn launch_in(&self, state: InstanceStateName) {
        self.lock().launch_state = Some(state);
    }

    pub fn add_instance(&self, instance: Instance) {
        self.lock().instances.push(instance);
    }

    pub fn add_volume(&self, volume: Volume) {
        self.lock().volumes.push(volume);
    }

    pub fn add_snapshot(&self, snapshot: Snapshot) {
        self.lock().snapshots.push(snapshot);
    }

    pub fn add_address(&self, address: Address) {
        self.lock().addresses.push(address);
    }

    pub fn add_security_group(&self, group: SecurityGroup) {
        self.lock().security_groups.push(group);
    }

    pub fn add_image(&self, image: Image) {
        self.lock().images.push(image);
    }

    pub fn set_instance_state(&self, id: &str, state: InstanceStateName, reason: Option<&str>) {
        let mut fake = self.lock();
        if let Some(instance) = fake.instances.iter_mut().find(|i| i.instance_id() == Some(id)) {
            instance.state = Some(InstanceState::builder().name(state).build());
            instance.state_reason = reason.map(|message| StateReason::builder().message(message).build());
        }
    }

    pub fn instance(&self, id: &str) -> Option<Instance> {
        self.lock()
            .instances
            .iter()
            .find(|i| i.instance_id() == Some(id))
            .cloned()
    }

    pub fn address(&self, public_ip: &str) -> Option<Address> {
        self.lock()
            .addresses
            .iter()
            .find(|a| a.public_ip() == Some(public_ip))
            .cloned()
    }

    pub fn security_group(&self, id: &str) -> Option<SecurityGroup> {
        self.lock()
            .security_groups
            .iter()
            .find(|g| g.group_id() == Some(id))
            .cloned()
    }

    pub fn volume_ids(&self) -> Vec<String> {
        self.lock()
            .volumes
            .iter()
            .filter_map(|v| v.volume_id().map(str::to_string))
            .collect()
    }

    fn set_tags(&self, operation: &'static str, ids: Vec<String>, tags: Vec<Tag>, add: bool) -> Result<()> {
        let mut state = self.call(operation, &ids.join(","))?;
        for id in &ids {
            let s = &mut *state;
            let found = tag_item(&mut s.instances, id, &tags, add)
                || tag_item(&mut s.volumes, id, &tags, add)
                || tag_item(&mut s.snapshots, id, &tags, add)
                || tag_item(&mut s.addresses, id, &tags, add)
                || tag_item(&mut s.security_groups, id, &tags, add)
                || tag_item(&mut s.subnets, id, &tags, add)
                || tag_item(&mut s.vpcs, id, &tags, add)
                || tag_item(&mut s.images, id, &tags, add);
            if !found {
                bail!("InvalidID: The ID '{}' is not valid", id);
            }
        }
        Ok(())
    }

    fn address_mut<'a>(state: &'a mut FakeState, address: &AddressRef) -> Result<&'a mut Address> {
        state
            .addresses
            .iter_mut()
            .find(|a| match address {
                AddressRef::AllocationId(id) => a.allocation_id() == Some(id.as_str()),
                AddressRef::AssociationId(id) => a.association_id() == Some(id.as_str()),
                AddressRef::PublicIp(ip) => a.public_ip() == Some(ip.as_str()),
            })
            .ok_or_else(|| anyhow!("InvalidAddress.NotFound: {:?}", address))
    }
}

fn address_target(address: &AddressRef) -> &str {
    match address {
        AddressRef::AllocationId(id) | AddressRef::AssociationId(id) | AddressRef::PublicIp(id) => id,
    }
}

#[async_trait]
impl Ec2Api for FakeEc2 {
    async fn create_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        self.set_tags("create_tags", resource_ids, tags, true)
    }

    async fn delete_tags(&self, resource_ids: Vec<String>, tags: Vec<Tag>) -> Result<()> {
        self.set_tags("delete_tags", resource_ids, tags, false)
    }

    async fn describe_instances(&self, request: DescribeRequest) -> Result<Vec<Reservation>> {
        let state = self.call("describe_instances", &request.ids.join(","))?;
        let instances = describe(&state.instances, &request, "InvalidInstanceID.NotFound")?;
        Ok(instances
            .into_iter()
            .map(|instance| Reservation::builder().instances(instance).build())
            .collect())
    }

    async fn run_instances(&self, params: RunInstancesParams) -> Result<Reservation> {
        let mut state = self.call("run_instances", &params.image_id)?;
        let id = state.next("i");
        let n = state.next_id;
        let launch_state = state.launch_state.clone().unwrap_or(InstanceStateName::Running);

        let mut builder = Instance::builder()
            .instance_id(&id)
            .image_id(&params.image_id)
            .instance_type(InstanceType::from(params.instance_type.as_str()))
            .state(InstanceState::builder().name(launch_state).build())
            .private_ip_address(
                params
                    .private_ip
                    .clone()
                    .unwrap_or_else(|| format!("10.0.0.{}", n % 250 + 2)),
            )
            .set_key_name(params.key_name.clone())
            .set_subnet_id(params.subnet_id.clone());
        if let Some(group) = &params.security_group_id {
            builder = builder.security_groups(GroupIdentifier::builder().group_id(group).build());
        }
        let instance = builder.build();

        state.instances.push(instance.clone());
        state.last_launch = Some(params);
        Ok(Reservation::builder()
            .reservation_id(format!("r-fake{:04}", n))
            .owner_id(ACCOUNT_ID)
            .instances(instance)
            .build())
    }

    async fn terminate_instances(&self, instance_ids: Vec<String>) -> Result<()> {
        let mut state = self.call("terminate_instances", &instance_ids.join(","))?;
        for id in &instance_ids {
            find_mut(&mut state.instances, id, "InvalidInstanceID.NotFound")?.state = Some(
                InstanceState::builder()
                    .name(InstanceStateName::Terminated)
                    .build(),
            );
        }
        Ok(())
    }

    async fn start_instance(&self, instance_id: &str) -> Result<()> {
        let mut state = self.call("start_instance", instance_id)?;
        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?.state =
            Some(InstanceState::builder().name(InstanceStateName::Running).build());
        Ok(())
    }

    async fn stop_instance(&self, instance_id: &str) -> Result<()> {
        let mut state = self.call("stop_instance", instance_id)?;
        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?.state =
            Some(InstanceState::builder().name(InstanceStateName::Stopped).build());
        Ok(())
    }

    async fn reboot_instance(&self, instance_id: &str) -> Result<()> {
        let mut state = self.call("reboot_instance", instance_id)?;
        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?;
        Ok(())
    }

    async fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        description: Option<String>,
    ) -> Result<String> {
        let mut state = self.call("create_image", instance_id)?;
        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?;
        let id = state.next("ami");
        state.images.push(
            Image::builder()
                .image_id(&id)
                .name(name)
                .set_description(description)
                .owner_id(ACCOUNT_ID)
                .public(false)
                .state(ImageState::Pending)
                .build(),
        );
        Ok(id)
    }

    async fn describe_images(&self, request: DescribeRequest) -> Result<Vec<Image>> {
        let state = self.call("describe_images", &request.ids.join(","))?;
        describe(&state.images, &request, "InvalidAMIID.NotFound")
    }

    async fn deregister_image(&self, image_id: &str) -> Result<()> {
        let mut state = self.call("deregister_image", image_id)?;
        remove(&mut state.images, image_id, "InvalidAMIID.NotFound")
    }

    async fn describe_volumes(&self, request: DescribeRequest) -> Result<Vec<Volume>> {
        let state = self.call("describe_volumes", &request.ids.join(","))?;
        describe(&state.volumes, &request, "InvalidVolume.NotFound")
    }

    async fn create_volume(&self, params: CreateVolumeParams) -> Result<String> {
        let mut state = self.call("create_volume", &params.snapshot_id)?;
        let id = state.next("vol");
        state.volumes.push(
            Volume::builder()
                .volume_id(&id)
                .snapshot_id(params.snapshot_id)
                .availability_zone(params.availability_zone)
                .set_size(params.size_gib)
                .state(VolumeState::Available)
                .build(),
        );
        Ok(id)
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        let mut state = self.call("delete_volume", volume_id)?;
        remove(&mut state.volumes, volume_id, "InvalidVolume.NotFound")
    }

    async fn describe_snapshots(&self, request: DescribeRequest) -> Result<Vec<Snapshot>> {
        let state = self.call("describe_snapshots", &request.ids.join(","))?;
        describe(&state.snapshots, &request, "InvalidSnapshot.NotFound")
    }

    async fn create_snapshot(&self, volume_id: &str, description: Option<String>) -> Result<String> {
        let mut state = self.call("create_snapshot", volume_id)?;
        let size = find_mut(&mut state.volumes, volume_id, "InvalidVolume.NotFound")?.size();
        let id = state.next("snap");
        state.snapshots.push(
            Snapshot::builder()
                .snapshot_id(&id)
                .volume_id(volume_id)
                .set_volume_size(size)
                .set_description(description)
                .owner_id(ACCOUNT_ID)
                .state(SnapshotState::Pending)
                .build(),
        );
        Ok(id)
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<()> {
        let mut state = self.call("delete_snapshot", snapshot_id)?;
        remove(&mut state.snapshots, snapshot_id, "InvalidSnapshot.NotFound")
    }

    async fn describe_addresses(&self, request: DescribeRequest) -> Result<Vec<Address>> {
        let state = self.call("describe_addresses", &request.ids.join(","))?;
        describe(&state.addresses, &request, "InvalidAddress.NotFound")
    }

    async fn allocate_address(&self, domain: DomainType) -> Result<Address> {
        let mut state = self.call("allocate_address", domain.as_str())?;
        let allocation_id = state.next("eipalloc");
        let n = state.next_id;
        let address = Address::builder()
            .public_ip(format!("198.51.100.{}", n % 250 + 1))
            .domain(domain.clone())
            .set_allocation_id((domain == DomainType::Vpc).then_some(allocation_id))
            .build();
        state.addresses.push(address.clone());
        Ok(address)
    }

    async fn release_address(&self, address: AddressRef) -> Result<()> {
        let mut state = self.call("release_address", address_target(&address))?;
        let public_ip = Self::address_mut(&mut state, &address)?
            .public_ip()
            .map(str::to_string);
        state.addresses.retain(|a| a.public_ip().map(str::to_string) != public_ip);
        Ok(())
    }

    async fn associate_address(&self, address: AddressRef, instance_id: &str) -> Result<Option<String>> {
        let mut state = self.call("associate_address", address_target(&address))?;
        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?;
        let association_id = state.next("eipassoc");

        let entry = Self::address_mut(&mut state, &address)?;
        entry.instance_id = Some(instance_id.to_string());
        entry.association_id = Some(association_id.clone());
        let public_ip = entry.public_ip().map(str::to_string);

        find_mut(&mut state.instances, instance_id, "InvalidInstanceID.NotFound")?.public_dns_name =
            public_ip.map(|ip| format!("ec2-{}.compute.amazonaws.com", ip.replace('.', "-")));
        Ok(Some(association_id))
    }

    async fn disassociate_address(&self, association: AddressRef) -> Result<()> {
        let mut state = self.call("disassociate_address", address_target(&association))?;
        let entry = Self::address_mut(&mut state, &association)?;
        entry.instance_id = None;
        entry.association_id = None;
        Ok(())
    }

    async fn describe_security_groups(&self, request: DescribeRequest) -> Result<Vec<SecurityGroup>> {
        let state = self.call("describe_security_groups", &request.ids.join(","))?;
        describe(&state.security_groups, &request, "InvalidGroup.NotFound")
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
        vpc_id: Option<String>,
    ) -> Result<String> {
        let mut state = self.call("create_security_group", name)?;
        let id = state.next("sg");
        state.security_groups.push(
            SecurityGroup::builder()
                .group_id(&id)
                .group_name(name)
                .description(description)
                .set_vpc_id(vpc_id)
                .build(),
        );
        Ok(id)
    }

    async fn delete_security_group(&self, group_id: &str) -> Result<()> {
        let mut state = self.call("delete_security_group", group_id)?;
        remove(&mut state.security_groups, group_id, "InvalidGroup.NotFound")
    }

    async fn authorize_ingress(&self, group_id: &str, permissions: Vec<IpPermission>) -> Result<()> {
        let mut state = self.call("authorize_ingress", group_id)?;
        let group = find_mut(&mut state.security_groups, group_id, "InvalidGroup.NotFound")?;
        group
            .ip_permissions
            .get_or_insert_with(Vec::new)
            .extend(permissions);
        Ok(())
    }

    async fn revoke_ingress(&self, group_id: &str, permissions: Vec<IpPermission>) -> Result<()> {
        let mut state = self.call("revoke_ingress", group_id)?;
        let group = find_mut(&mut state.security_groups, group_id, "InvalidGroup.NotFound")?;
        if let Some(existing) = group.ip_permissions.as_mut() {
            existing.retain(|rule| {
                !permissions.iter().any(|revoked| {
                    revoked.from_port() == rule.from_port() && revoked.to_port() == rule.to_port()
                })
            });
        }
        Ok(())
    }

    async fn describe_subnets(&self, request: DescribeRequest) -> Result<Vec<Subnet>> {
        let state = self.call("describe_subnets", &request.ids.join(","))?;
        describe(&state.subnets, &request, "InvalidSubnetID.NotFound")
    }

    async fn create_subnet(&self, vpc_id: &str, cidr_block: &str) -> Result<Subnet> {
        let mut state = self.call("create_subnet", vpc_id)?;
        if !state.vpcs.iter().any(|vpc| vpc.vpc_id() == Some(vpc_id)) {
            bail!("InvalidVpcID.NotFound: The vpc ID '{}' does not exist", vpc_id);
        }
        let subnet = Subnet::builder()
            .subnet_id(state.next("subnet"))
            .vpc_id(vpc_id)
            .cidr_block(cidr_block)
            .build();
        state.subnets.push(subnet.clone());
        Ok(subnet)
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<()> {
        let mut state = self.call("delete_subnet", subnet_id)?;
        remove(&mut state.subnets, subnet_id, "InvalidSubnetID.NotFound")
    }

    async fn describe_vpcs(&self, request: DescribeRequest) -> Result<Vec<Vpc>> {
        let state = self.call("describe_vpcs", &request.ids.join(","))?;
        describe(&state.vpcs, &request, "InvalidVpcID.NotFound")
    }

    async fn create_vpc(&self, cidr_block: &str) -> Result<Vpc> {
        let mut state = self.call("create_vpc", cidr_block)?;
        let vpc = Vpc::builder()
            .vpc_id(state.next("vpc"))
            .cidr_block(cidr_block)
            .is_default(false)
            .build();
        state.vpcs.push(vpc.clone());
        Ok(vpc)
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<()> {
        let mut state = self.call("delete_vpc", vpc_id)?;
        if state.subnets.iter().any(|subnet| subnet.vpc_id() == Some(vpc_id)) {
            bail!("DependencyViolation: The vpc '{}' has dependencies and cannot be deleted", vpc_id);
        }
        remove(&mut state.vpcs, vpc_id, "InvalidVpcID.NotFound")
    }
}

/// Attach `volume` to `instance_id` at `device`
pub fn attached(volume: Volume, instance_id: &str, device: &str) -> Volume {
    let mut volume = volume;
    volume.attachments = Some(vec![
        VolumeAttachment::builder()
            .instance_id(instance_id)
            .device(device)
            .build(),
    ]);
    volume.state = Some(VolumeState::InUse);
    volume
}
